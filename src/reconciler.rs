// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Operating mode selection and the reconciliation loop.
//!
//! The mode is chosen once at startup:
//!
//! - **CoreDNS mode** - no hosts file given; one instance per cluster rewrites the
//!   shared DNS `ConfigMap`
//! - **Hosts-file mode** - a writable hosts file given; one instance per node
//!   rewrites that file
//!
//! Each cycle collects hosts, reads the artifact, patches it, and writes it back
//! only on change. Cycles run strictly one after another with a fixed sleep in
//! between. A fatal error ends the loop; a conflicting `ConfigMap` write is
//! retried by the next cycle.

use crate::config::ControllerConfig;
use crate::constants::REWRITE_TARGET;
use crate::errors::HairpinError;
use crate::ingress::{collect_hosts, IngressSource, KubeIngressSource};
use crate::metrics::{record_artifact_updated, record_cycle_error, record_cycle_success};
use crate::patch::{patch_corefile, patch_hosts_file};
use crate::resolver::{AddressResolver, SystemResolver};
use crate::store::{apply_if_changed, ApplyOutcome, ArtifactStore, ConfigMapStore, HostsFileStore};
use kube::Client;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Which artifact this process instance owns lines in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperatingMode {
    /// Rewrite rules in the cluster DNS `ConfigMap`
    CoreDns,
    /// A single hosts line in this node's hosts file
    HostsFile(PathBuf),
}

const COREDNS_LABEL: &str = "coredns";
const HOSTS_FILE_LABEL: &str = "hosts_file";

impl OperatingMode {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::CoreDns => COREDNS_LABEL,
            Self::HostsFile(_) => HOSTS_FILE_LABEL,
        }
    }
}

/// Choose the operating mode from the optional hosts file flag.
///
/// # Errors
///
/// Returns [`HairpinError::HostsFileUnavailable`] if a path was supplied but does
/// not exist, is not a regular file, or cannot be opened for writing.
pub fn select_mode(hosts_file: Option<&Path>) -> Result<OperatingMode, HairpinError> {
    let Some(path) = hosts_file else {
        return Ok(OperatingMode::CoreDns);
    };

    let unavailable = |reason: String| HairpinError::HostsFileUnavailable {
        path: path.to_path_buf(),
        reason,
    };

    let metadata = std::fs::metadata(path).map_err(|e| unavailable(e.to_string()))?;
    if !metadata.is_file() {
        return Err(unavailable("not a regular file".to_string()));
    }

    // Opening for append checks writability without touching the contents.
    OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| unavailable(e.to_string()))?;

    Ok(OperatingMode::HostsFile(path.to_path_buf()))
}

/// How the current artifact text is turned into the desired one.
enum Patcher {
    Corefile,
    HostsFile { resolver: Box<dyn AddressResolver> },
}

/// Result of one successful reconciliation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Number of hosts now hairpinned
    pub host_count: usize,
    /// Whether the artifact was rewritten
    pub outcome: ApplyOutcome,
}

/// Drives collect -> patch -> apply on a fixed interval.
pub struct Reconciler {
    mode_label: &'static str,
    ingresses: Box<dyn IngressSource>,
    store: Box<dyn ArtifactStore>,
    patcher: Patcher,
    ingress_class: Option<String>,
    poll_interval: Duration,
}

impl Reconciler {
    /// Reconciler that patches a Corefile held in `store`.
    #[must_use]
    pub fn coredns(
        config: &ControllerConfig,
        ingresses: Box<dyn IngressSource>,
        store: Box<dyn ArtifactStore>,
    ) -> Self {
        Self {
            mode_label: COREDNS_LABEL,
            ingresses,
            store,
            patcher: Patcher::Corefile,
            ingress_class: config.ingress_class.clone(),
            poll_interval: config.poll_interval,
        }
    }

    /// Reconciler that patches a hosts file held in `store`.
    #[must_use]
    pub fn hosts_file(
        config: &ControllerConfig,
        ingresses: Box<dyn IngressSource>,
        store: Box<dyn ArtifactStore>,
        resolver: Box<dyn AddressResolver>,
    ) -> Self {
        Self {
            mode_label: HOSTS_FILE_LABEL,
            ingresses,
            store,
            patcher: Patcher::HostsFile { resolver },
            ingress_class: config.ingress_class.clone(),
            poll_interval: config.poll_interval,
        }
    }

    /// Reconciler for `mode` backed by the Kubernetes API and the local system.
    #[must_use]
    pub fn for_cluster(client: Client, mode: &OperatingMode, config: &ControllerConfig) -> Self {
        let ingresses = Box::new(KubeIngressSource::new(client.clone(), config.api_timeout));
        match mode {
            OperatingMode::CoreDns => {
                let store =
                    ConfigMapStore::new(client, config.configmap.clone(), config.api_timeout);
                Self::coredns(config, ingresses, Box::new(store))
            }
            OperatingMode::HostsFile(path) => Self::hosts_file(
                config,
                ingresses,
                Box::new(HostsFileStore::new(path)),
                Box::new(SystemResolver::new(config.api_timeout)),
            ),
        }
    }

    /// Run a single reconciliation cycle.
    ///
    /// # Errors
    ///
    /// Returns any collection, read, resolution, patch, or write error.
    pub async fn run_cycle(&self) -> Result<CycleReport, HairpinError> {
        info!(mode = self.mode_label, "Fetching hosts");

        let hosts = collect_hosts(self.ingresses.as_ref(), self.ingress_class.as_deref()).await?;
        debug!(count = hosts.len(), "Collected TLS ingress hosts");

        let current = self.store.read().await?;

        let desired = match &self.patcher {
            Patcher::Corefile => patch_corefile(&current.text, &hosts)?,
            Patcher::HostsFile { resolver } => {
                let address = resolver.resolve(REWRITE_TARGET).await?;
                patch_hosts_file(&current.text, &hosts, address)
            }
        };

        let outcome = apply_if_changed(&current, &desired, self.store.as_ref()).await?;
        if outcome == ApplyOutcome::Updated {
            record_artifact_updated(self.mode_label);
        }

        Ok(CycleReport {
            host_count: hosts.len(),
            outcome,
        })
    }

    /// Run cycles forever, sleeping the poll interval after each one.
    ///
    /// # Errors
    ///
    /// Returns the first non-recoverable error; it is logged with the artifact
    /// location before being returned. The loop never ends with `Ok`.
    pub async fn run(&self) -> Result<(), HairpinError> {
        info!(
            mode = self.mode_label,
            target_artifact = %self.store.describe(),
            poll_interval = ?self.poll_interval,
            ingress_class = ?self.ingress_class,
            "Starting reconciliation loop"
        );

        loop {
            let started = Instant::now();
            match self.run_cycle().await {
                Ok(report) => {
                    record_cycle_success(self.mode_label, started.elapsed(), report.host_count);
                    debug!(
                        hosts = report.host_count,
                        outcome = ?report.outcome,
                        elapsed = ?started.elapsed(),
                        "Reconciliation cycle complete"
                    );
                }
                Err(e) if e.is_recoverable() => {
                    record_cycle_error(self.mode_label, started.elapsed(), e.kind());
                    warn!(error = %e, "Reconciliation cycle failed, retrying next cycle");
                }
                Err(e) => {
                    record_cycle_error(self.mode_label, started.elapsed(), e.kind());
                    error!(
                        target_artifact = %self.store.describe(),
                        error = %e,
                        "Reconciliation failed"
                    );
                    return Err(e);
                }
            }

            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod reconciler_tests;
