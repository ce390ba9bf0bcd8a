// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Error types for the hairpin-proxy controller.
//!
//! Only one failure is absorbed inside a reconciliation cycle: an `Ingress` API
//! version the cluster does not serve. A rejected `ConfigMap` update caused by a
//! concurrent writer is recoverable on the next cycle. Everything else is fatal and
//! terminates the process so the deployment's restart policy takes over.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while collecting hosts, patching artifacts, or writing them back.
#[derive(Error, Debug)]
pub enum HairpinError {
    /// The cluster does not serve `Ingress` at this API version (HTTP 404).
    ///
    /// Absorbed by the host collector, which treats the version as empty.
    #[error("Ingress API version '{api_version}' is not served by this cluster")]
    UnsupportedResourceVersion {
        /// Group/version that was queried, e.g. `extensions/v1beta1`
        api_version: String,
    },

    /// The Corefile has no catch-all server block to anchor rewrite rules in.
    #[error("Can't find main server line '{anchor}' in Corefile ({line_count} lines inspected)")]
    ConfigAnchorMissing {
        /// The opener that was searched for
        anchor: String,
        /// Number of non-owned lines in the Corefile
        line_count: usize,
    },

    /// The DNS `ConfigMap` does not exist.
    #[error("ConfigMap {namespace}/{name} not found")]
    ConfigMapNotFound {
        /// Namespace that was queried
        namespace: String,
        /// `ConfigMap` name
        name: String,
    },

    /// The DNS `ConfigMap` exists but lacks the configured data key.
    #[error("ConfigMap {namespace}/{name} has no data key '{key}'")]
    ConfigMapKeyMissing {
        /// Namespace of the `ConfigMap`
        namespace: String,
        /// `ConfigMap` name
        name: String,
        /// Data key that was expected
        key: String,
    },

    /// The `ConfigMap` changed between read and write (HTTP 409).
    #[error("ConfigMap {namespace}/{name} was modified concurrently; retrying next cycle")]
    BackendConflict {
        /// Namespace of the `ConfigMap`
        namespace: String,
        /// `ConfigMap` name
        name: String,
    },

    /// Reading or writing the hosts file failed.
    #[error("I/O error on hosts file {}: {source}", .path.display())]
    HostsFileIo {
        /// Path of the hosts file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A hosts file path was supplied but is missing or read-only.
    #[error("Hosts file {} does not exist or is not writable: {reason}", .path.display())]
    HostsFileUnavailable {
        /// Path that was supplied on the command line
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },

    /// The rewrite target could not be resolved to an address.
    #[error("Failed to resolve '{name}': {reason}")]
    Resolution {
        /// Name that was looked up
        name: String,
        /// Reason for the failure
        reason: String,
    },

    /// A Kubernetes API call or lookup exceeded its time budget.
    #[error("{operation} timed out after {timeout_secs}s")]
    Timeout {
        /// Human-readable description of the operation
        operation: String,
        /// Time budget in seconds
        timeout_secs: u64,
    },

    /// Any other Kubernetes API failure.
    #[error("Kubernetes API error during {operation}: {source}")]
    Kube {
        /// Human-readable description of the operation
        operation: String,
        /// Underlying kube error
        #[source]
        source: kube::Error,
    },
}

impl HairpinError {
    /// Whether the next scheduled cycle can be expected to succeed without intervention.
    ///
    /// Only `BackendConflict` qualifies: fresh state is re-read every cycle, so the
    /// conflicting write is simply retried.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::BackendConflict { .. })
    }

    /// Short, label-safe name of the error kind for metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedResourceVersion { .. } => "unsupported_resource_version",
            Self::ConfigAnchorMissing { .. } => "config_anchor_missing",
            Self::ConfigMapNotFound { .. } => "configmap_not_found",
            Self::ConfigMapKeyMissing { .. } => "configmap_key_missing",
            Self::BackendConflict { .. } => "backend_conflict",
            Self::HostsFileIo { .. } => "hosts_file_io",
            Self::HostsFileUnavailable { .. } => "hosts_file_unavailable",
            Self::Resolution { .. } => "resolution",
            Self::Timeout { .. } => "timeout",
            Self::Kube { .. } => "kube_api",
        }
    }
}

/// Errors raised while building the controller configuration from the environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but its value cannot be parsed.
    #[error("Invalid value '{value}' for {variable}: {reason}")]
    InvalidValue {
        /// Environment variable name
        variable: String,
        /// Raw value that was rejected
        value: String,
        /// Why it was rejected
        reason: String,
    },
}

#[cfg(test)]
#[path = "errors_tests.rs"]
mod errors_tests;
