// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! # hairpin-proxy - in-cluster DNS for TLS Ingress hosts
//!
//! Traffic from inside a cluster to a hostname served by one of its own
//! `Ingress` resources normally leaves the cluster and comes back through the
//! external load balancer. This controller keeps cluster DNS (or a node's hosts
//! file) pointed at an in-cluster hairpin proxy for every TLS `Ingress` host, so
//! that traffic stays inside.
//!
//! ## Modules
//!
//! - [`ingress`] - host collection across every `Ingress` API version
//! - [`patch`] - pure Corefile and hosts file transforms
//! - [`store`] - backing stores and the change detector
//! - [`resolver`] - rewrite target address lookup
//! - [`reconciler`] - mode selection and the reconciliation loop
//! - [`config`] - immutable configuration built at startup
//! - [`metrics`] - Prometheus metrics
//!
//! ## Example
//!
//! ```rust
//! use hairpin_proxy::ingress::HostSet;
//! use hairpin_proxy::patch::patch_corefile;
//!
//! let hosts: HostSet = ["b.com", "a.com"].into_iter().collect();
//! let corefile = patch_corefile(".:53 {\n    forward . 8.8.8.8\n}", &hosts).unwrap();
//! assert!(corefile.lines().nth(1).unwrap().contains("rewrite name a.com"));
//! ```

pub mod api;
pub mod config;
pub mod constants;
pub mod errors;
pub mod ingress;
pub mod metrics;
pub mod patch;
pub mod reconciler;
pub mod resolver;
pub mod store;
