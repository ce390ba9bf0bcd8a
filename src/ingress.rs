// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Host collection from cluster `Ingress` resources.
//!
//! `Ingress` has been served under three API group/versions across Kubernetes
//! releases. Every version is queried each cycle; versions the cluster does not
//! serve contribute nothing. TLS hostnames from all surviving records are merged
//! into a [`HostSet`], whose sorted order drives the line order of every patched
//! artifact.

use crate::api::{bounded, is_not_found, list_all_paginated};
use crate::constants::{INGRESS_CLASS_ANNOTATION, INGRESS_PLURAL, KIND_INGRESS};
use crate::errors::HairpinError;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind, ListParams};
use kube::{Api, Client, ResourceExt};
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// `Ingress` API group/versions queried every cycle, newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IngressApiVersion {
    NetworkingV1,
    NetworkingV1Beta1,
    ExtensionsV1Beta1,
}

impl IngressApiVersion {
    /// All versions, in query order.
    pub const ALL: [Self; 3] = [
        Self::NetworkingV1,
        Self::NetworkingV1Beta1,
        Self::ExtensionsV1Beta1,
    ];

    #[must_use]
    pub fn group(self) -> &'static str {
        match self {
            Self::NetworkingV1 | Self::NetworkingV1Beta1 => "networking.k8s.io",
            Self::ExtensionsV1Beta1 => "extensions",
        }
    }

    #[must_use]
    pub fn version(self) -> &'static str {
        match self {
            Self::NetworkingV1 => "v1",
            Self::NetworkingV1Beta1 | Self::ExtensionsV1Beta1 => "v1beta1",
        }
    }

    /// Fully qualified `group/version` string.
    #[must_use]
    pub fn api_version(self) -> &'static str {
        match self {
            Self::NetworkingV1 => "networking.k8s.io/v1",
            Self::NetworkingV1Beta1 => "networking.k8s.io/v1beta1",
            Self::ExtensionsV1Beta1 => "extensions/v1beta1",
        }
    }

    fn api_resource(self) -> ApiResource {
        let gvk = GroupVersionKind::gvk(self.group(), self.version(), KIND_INGRESS);
        ApiResource::from_gvk_with_plural(&gvk, INGRESS_PLURAL)
    }
}

impl fmt::Display for IngressApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_version())
    }
}

/// The parts of an `Ingress` that matter for host collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngressRecord {
    pub name: String,
    pub namespace: Option<String>,
    /// Value of the `kubernetes.io/ingress.class` annotation
    pub class: Option<String>,
    /// One entry per `spec.tls` block, each with its raw host list
    pub tls: Vec<Vec<String>>,
}

impl IngressRecord {
    /// Extract a record from an `Ingress` of any API version.
    ///
    /// Every version shares the `spec.tls[].hosts[]` shape, so a single dynamic
    /// extraction covers all of them. Null or non-string host entries are skipped.
    #[must_use]
    pub fn from_dynamic(obj: &DynamicObject) -> Self {
        let class = obj.annotations().get(INGRESS_CLASS_ANNOTATION).cloned();

        let tls = obj
            .data
            .get("spec")
            .and_then(|spec| spec.get("tls"))
            .and_then(Value::as_array)
            .map(|blocks| {
                blocks
                    .iter()
                    .map(|block| {
                        block
                            .get("hosts")
                            .and_then(Value::as_array)
                            .map(|hosts| {
                                hosts
                                    .iter()
                                    .filter_map(Value::as_str)
                                    .map(str::to_string)
                                    .collect()
                            })
                            .unwrap_or_default()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            name: obj.name_any(),
            namespace: obj.namespace(),
            class,
            tls,
        }
    }
}

/// Whether `host` consists only of `[A-Za-z0-9.-_]` and is non-empty.
#[must_use]
pub fn is_valid_hostname(host: &str) -> bool {
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Sorted, deduplicated set of valid hostnames.
///
/// Invalid names are silently discarded on insertion, so every `HostSet` holds
/// only names accepted by [`is_valid_hostname`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostSet(BTreeSet<String>);

impl HostSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `host`, returning `false` if it was invalid or already present.
    pub fn insert(&mut self, host: impl Into<String>) -> bool {
        let host = host.into();
        if !is_valid_hostname(&host) {
            return false;
        }
        self.0.insert(host)
    }

    /// Hostnames in ascending lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for HostSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for host in iter {
            set.insert(host);
        }
        set
    }
}

impl<'a> IntoIterator for &'a HostSet {
    type Item = &'a String;
    type IntoIter = std::collections::btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Read access to `Ingress` resources.
#[async_trait::async_trait]
pub trait IngressSource: Send + Sync {
    /// List every `Ingress` in the cluster at `version`.
    ///
    /// # Errors
    ///
    /// Returns [`HairpinError::UnsupportedResourceVersion`] if the cluster does not
    /// serve `version`, or any other error for failures that should abort the cycle.
    async fn list_ingresses(
        &self,
        version: IngressApiVersion,
    ) -> Result<Vec<IngressRecord>, HairpinError>;
}

/// Map a failed listing to the collector's error model: HTTP 404 means the
/// cluster does not serve `version`.
pub(crate) fn list_error(
    version: IngressApiVersion,
    operation: &str,
    source: kube::Error,
) -> HairpinError {
    if is_not_found(&source) {
        HairpinError::UnsupportedResourceVersion {
            api_version: version.api_version().to_string(),
        }
    } else {
        HairpinError::Kube {
            operation: operation.to_string(),
            source,
        }
    }
}

/// [`IngressSource`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeIngressSource {
    client: Client,
    timeout: Duration,
}

impl KubeIngressSource {
    #[must_use]
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }
}

#[async_trait::async_trait]
impl IngressSource for KubeIngressSource {
    async fn list_ingresses(
        &self,
        version: IngressApiVersion,
    ) -> Result<Vec<IngressRecord>, HairpinError> {
        let operation = format!("list ingresses ({version})");
        let api: Api<DynamicObject> = Api::all_with(self.client.clone(), &version.api_resource());

        let objects = bounded(&operation, self.timeout, async {
            list_all_paginated(&api, ListParams::default())
                .await
                .map_err(|source| list_error(version, &operation, source))
        })
        .await?;

        Ok(objects.iter().map(IngressRecord::from_dynamic).collect())
    }
}

/// Collect the TLS hostnames of every `Ingress` in the cluster.
///
/// API versions reported as unsupported are logged and skipped. When
/// `class_filter` is set, only records whose class annotation equals it
/// contribute hosts.
///
/// # Errors
///
/// Returns the first listing error other than
/// [`HairpinError::UnsupportedResourceVersion`].
pub async fn collect_hosts<S>(source: &S, class_filter: Option<&str>) -> Result<HostSet, HairpinError>
where
    S: IngressSource + ?Sized,
{
    let mut records = Vec::new();

    for version in IngressApiVersion::ALL {
        match source.list_ingresses(version).await {
            Ok(found) => {
                debug!(api_version = %version, count = found.len(), "Listed ingresses");
                records.extend(found);
            }
            Err(HairpinError::UnsupportedResourceVersion { api_version }) => {
                warn!(
                    api_version = %api_version,
                    "Ingress API version not served by this cluster, skipping"
                );
            }
            Err(e) => return Err(e),
        }
    }

    Ok(hosts_from_records(&records, class_filter))
}

/// Flatten the TLS hosts of `records` into a [`HostSet`].
#[must_use]
pub fn hosts_from_records(records: &[IngressRecord], class_filter: Option<&str>) -> HostSet {
    records
        .iter()
        .filter(|record| match class_filter {
            Some(wanted) => record.class.as_deref() == Some(wanted),
            None => true,
        })
        .flat_map(|record| record.tls.iter().flatten())
        .filter(|host| {
            let valid = is_valid_hostname(host);
            if !valid && !host.is_empty() {
                debug!(host = %host, "Discarding invalid hostname");
            }
            valid
        })
        .cloned()
        .collect()
}

#[cfg(test)]
#[path = "ingress_tests.rs"]
mod ingress_tests;
