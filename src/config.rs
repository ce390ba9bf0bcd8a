// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Controller configuration.
//!
//! The configuration is read once at startup and passed by reference into every
//! component. Nothing reads the environment after [`ControllerConfig::from_env`]
//! returns.

use crate::constants::{
    DEFAULT_API_TIMEOUT_SECS, DEFAULT_COREDNS_CONFIGMAP_KEY, DEFAULT_COREDNS_CONFIGMAP_NAME,
    DEFAULT_COREDNS_NAMESPACE, DEFAULT_POLL_INTERVAL_SECS, ENV_API_TIMEOUT,
    ENV_COREDNS_CONFIGMAP_KEY, ENV_COREDNS_CONFIGMAP_NAME, ENV_COREDNS_CONFIGMAP_NAMESPACE,
    ENV_INGRESS_CLASS, ENV_METRICS_PORT, ENV_POLL_INTERVAL, METRICS_SERVER_PORT,
    MIN_POLL_INTERVAL_SECS,
};
use crate::errors::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Location of the DNS `ConfigMap` mutated in CoreDNS mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMapTarget {
    pub namespace: String,
    pub name: String,
    /// Data key holding the Corefile
    pub key: String,
}

impl Default for ConfigMapTarget {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_COREDNS_NAMESPACE.to_string(),
            name: DEFAULT_COREDNS_CONFIGMAP_NAME.to_string(),
            key: DEFAULT_COREDNS_CONFIGMAP_KEY.to_string(),
        }
    }
}

/// Immutable controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Delay between reconciliation cycles (never below one second)
    pub poll_interval: Duration,

    /// Only `Ingress` resources annotated with this class contribute hosts
    pub ingress_class: Option<String>,

    /// DNS `ConfigMap` used in CoreDNS mode
    pub configmap: ConfigMapTarget,

    /// Hosts file supplied on the command line; selects hosts-file mode
    pub hosts_file: Option<PathBuf>,

    /// Upper bound for each Kubernetes API call and address lookup
    pub api_timeout: Duration,

    /// Port for the `/metrics` endpoint, `None` when disabled
    pub metrics_port: Option<u16>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            ingress_class: None,
            configmap: ConfigMapTarget::default(),
            hosts_file: None,
            api_timeout: Duration::from_secs(DEFAULT_API_TIMEOUT_SECS),
            metrics_port: Some(METRICS_SERVER_PORT),
        }
    }
}

impl ControllerConfig {
    /// Build the configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a numeric variable cannot be parsed.
    pub fn from_env(hosts_file: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), hosts_file)
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// Unset and empty variables fall back to their defaults. The poll interval is
    /// clamped to [`MIN_POLL_INTERVAL_SECS`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a numeric variable cannot be parsed.
    pub fn from_lookup<F>(lookup: F, hosts_file: Option<PathBuf>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let poll_secs = parse_var::<u64>(ENV_POLL_INTERVAL, get(ENV_POLL_INTERVAL))?
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
            .max(MIN_POLL_INTERVAL_SECS);

        let timeout_secs = parse_var::<u64>(ENV_API_TIMEOUT, get(ENV_API_TIMEOUT))?
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS)
            .max(1);

        let metrics_port = match parse_var::<u16>(ENV_METRICS_PORT, get(ENV_METRICS_PORT))? {
            Some(0) => None,
            Some(port) => Some(port),
            None => Some(METRICS_SERVER_PORT),
        };

        let defaults = ConfigMapTarget::default();
        let configmap = ConfigMapTarget {
            namespace: get(ENV_COREDNS_CONFIGMAP_NAMESPACE).unwrap_or(defaults.namespace),
            name: get(ENV_COREDNS_CONFIGMAP_NAME).unwrap_or(defaults.name),
            key: get(ENV_COREDNS_CONFIGMAP_KEY).unwrap_or(defaults.key),
        };

        Ok(Self {
            poll_interval: Duration::from_secs(poll_secs),
            ingress_class: get(ENV_INGRESS_CLASS),
            configmap,
            hosts_file,
            api_timeout: Duration::from_secs(timeout_secs),
            metrics_port,
        })
    }
}

fn parse_var<T>(variable: &str, raw: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.map(|value| {
        value.parse::<T>().map_err(|e| ConfigError::InvalidValue {
            variable: variable.to_string(),
            value: value.clone(),
            reason: e.to_string(),
        })
    })
    .transpose()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
