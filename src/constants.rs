// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Global constants for the hairpin-proxy controller.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Ownership Constants
// ============================================================================

/// Trailing marker appended to every line this controller generates.
///
/// Lines ending with this tag are owned and regenerated every cycle; all other
/// lines are foreign and preserved byte-for-byte.
pub const OWNERSHIP_TAG: &str = "# Added by hairpin-proxy";

/// Internal service name every rewrite rule points at
pub const REWRITE_TARGET: &str = "hairpin-proxy.hairpin-proxy.svc.cluster.local";

// ============================================================================
// CoreDNS Constants
// ============================================================================

/// Opening line of the catch-all server block in a Corefile
pub const MAIN_SERVER_BLOCK: &str = ".:53 {";

/// Indentation used for generated Corefile directives
pub const COREFILE_INDENT: &str = "    ";

/// Namespace holding the cluster DNS `ConfigMap`
pub const DEFAULT_COREDNS_NAMESPACE: &str = "kube-system";

/// Default name of the cluster DNS `ConfigMap`
pub const DEFAULT_COREDNS_CONFIGMAP_NAME: &str = "coredns";

/// Default data key holding the Corefile
pub const DEFAULT_COREDNS_CONFIGMAP_KEY: &str = "Corefile";

// ============================================================================
// Ingress Constants
// ============================================================================

/// Annotation carrying the ingress class of an `Ingress`
pub const INGRESS_CLASS_ANNOTATION: &str = "kubernetes.io/ingress.class";

/// Kind name for `Ingress` resources
pub const KIND_INGRESS: &str = "Ingress";

/// Plural resource name for `Ingress` resources
pub const INGRESS_PLURAL: &str = "ingresses";

/// Page size used when listing resources from the Kubernetes API
pub const KUBE_LIST_PAGE_SIZE: u32 = 100;

// ============================================================================
// Timing Constants
// ============================================================================

/// Default delay between reconciliation cycles
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 15;

/// Lower bound for the delay between reconciliation cycles
pub const MIN_POLL_INTERVAL_SECS: u64 = 1;

/// Default upper bound for any single Kubernetes API call or DNS lookup
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Environment Variable Names
// ============================================================================

/// Poll interval in seconds
pub const ENV_POLL_INTERVAL: &str = "POLL_INTERVAL";

/// Ingress class filter (empty means no filtering)
pub const ENV_INGRESS_CLASS: &str = "INGRESS_CLASS";

/// Name of the DNS `ConfigMap`
pub const ENV_COREDNS_CONFIGMAP_NAME: &str = "COREDNS_CONFIGMAP_NAME";

/// Data key of the DNS `ConfigMap`
pub const ENV_COREDNS_CONFIGMAP_KEY: &str = "COREDNS_CONFIGMAP_KEY";

/// Namespace of the DNS `ConfigMap`
pub const ENV_COREDNS_CONFIGMAP_NAMESPACE: &str = "COREDNS_CONFIGMAP_NAMESPACE";

/// Per-call timeout in seconds
pub const ENV_API_TIMEOUT: &str = "API_TIMEOUT_SECS";

/// Metrics server port (0 disables the server)
pub const ENV_METRICS_PORT: &str = "METRICS_PORT";

// ============================================================================
// Metrics Server Constants
// ============================================================================

/// Default port for Prometheus metrics HTTP server
pub const METRICS_SERVER_PORT: u16 = 8080;

/// Path for Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for metrics HTTP server
pub const METRICS_SERVER_BIND_ADDRESS: &str = "0.0.0.0";

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 2;
