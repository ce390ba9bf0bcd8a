// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Unit tests for `config.rs`

#[cfg(test)]
mod tests {
    use crate::config::{ConfigMapTarget, ControllerConfig};
    use crate::errors::ConfigError;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn config_from(vars: &[(&str, &str)]) -> Result<ControllerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ControllerConfig::from_lookup(|key| vars.get(key).cloned(), None)
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(15));
        assert_eq!(config.ingress_class, None);
        assert_eq!(config.configmap.namespace, "kube-system");
        assert_eq!(config.configmap.name, "coredns");
        assert_eq!(config.configmap.key, "Corefile");
        assert_eq!(config.hosts_file, None);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = config_from(&[
            ("POLL_INTERVAL", "60"),
            ("INGRESS_CLASS", "nginx"),
            ("COREDNS_CONFIGMAP_NAME", "coredns-custom"),
            ("COREDNS_CONFIGMAP_KEY", "Corefile.override"),
            ("COREDNS_CONFIGMAP_NAMESPACE", "dns"),
            ("API_TIMEOUT_SECS", "5"),
            ("METRICS_PORT", "9090"),
        ])
        .unwrap();

        assert_eq!(config.poll_interval, Duration::from_secs(60));
        assert_eq!(config.ingress_class.as_deref(), Some("nginx"));
        assert_eq!(
            config.configmap,
            ConfigMapTarget {
                namespace: "dns".to_string(),
                name: "coredns-custom".to_string(),
                key: "Corefile.override".to_string(),
            }
        );
        assert_eq!(config.api_timeout, Duration::from_secs(5));
        assert_eq!(config.metrics_port, Some(9090));
    }

    #[test]
    fn test_poll_interval_is_clamped_to_one_second() {
        let config = config_from(&[("POLL_INTERVAL", "0")]).unwrap();
        assert_eq!(config.poll_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_empty_ingress_class_disables_filtering() {
        let config = config_from(&[("INGRESS_CLASS", "   ")]).unwrap();
        assert_eq!(config.ingress_class, None);
    }

    #[test]
    fn test_metrics_port_zero_disables_server() {
        let config = config_from(&[("METRICS_PORT", "0")]).unwrap();
        assert_eq!(config.metrics_port, None);
    }

    #[test]
    fn test_invalid_poll_interval_is_rejected() {
        let err = config_from(&[("POLL_INTERVAL", "soon")]).unwrap_err();

        match err {
            ConfigError::InvalidValue {
                variable, value, ..
            } => {
                assert_eq!(variable, "POLL_INTERVAL");
                assert_eq!(value, "soon");
            }
        }
    }

    #[test]
    fn test_negative_poll_interval_is_rejected() {
        assert!(config_from(&[("POLL_INTERVAL", "-5")]).is_err());
    }

    #[test]
    fn test_hosts_file_is_carried_through() {
        let config =
            ControllerConfig::from_lookup(|_| None, Some(PathBuf::from("/etc/hosts"))).unwrap();
        assert_eq!(config.hosts_file, Some(PathBuf::from("/etc/hosts")));
    }
}
