// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

// Common test utilities for integration tests

#![allow(dead_code)]

use hairpin_proxy::errors::HairpinError;
use hairpin_proxy::ingress::{IngressApiVersion, IngressRecord, IngressSource};
use hairpin_proxy::resolver::AddressResolver;
use hairpin_proxy::store::{Artifact, ArtifactStore};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// Build an ingress record with one TLS block per entry of `tls`.
pub fn ingress(name: &str, class: Option<&str>, tls: &[&[&str]]) -> IngressRecord {
    IngressRecord {
        name: name.to_string(),
        namespace: Some("default".to_string()),
        class: class.map(str::to_string),
        tls: tls
            .iter()
            .map(|hosts| hosts.iter().map(|h| (*h).to_string()).collect())
            .collect(),
    }
}

/// In-memory ingress listing keyed by API version.
///
/// Versions without an entry answer as not served by the cluster.
#[derive(Clone, Default)]
pub struct FakeIngresses {
    served: Arc<Mutex<HashMap<IngressApiVersion, Vec<IngressRecord>>>>,
}

impl FakeIngresses {
    pub fn serving(version: IngressApiVersion, records: Vec<IngressRecord>) -> Self {
        let fake = Self::default();
        fake.set(version, records);
        fake
    }

    pub fn set(&self, version: IngressApiVersion, records: Vec<IngressRecord>) {
        self.served.lock().unwrap().insert(version, records);
    }
}

#[async_trait::async_trait]
impl IngressSource for FakeIngresses {
    async fn list_ingresses(
        &self,
        version: IngressApiVersion,
    ) -> Result<Vec<IngressRecord>, HairpinError> {
        self.served
            .lock()
            .unwrap()
            .get(&version)
            .cloned()
            .ok_or_else(|| HairpinError::UnsupportedResourceVersion {
                api_version: version.api_version().to_string(),
            })
    }
}

/// In-memory `ConfigMap`-like store with a revision counter.
///
/// Writes carrying a stale revision are rejected as conflicts.
#[derive(Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<(String, u64)>>,
    writes: Arc<Mutex<Vec<String>>>,
}

impl MemoryStore {
    pub fn new(text: &str) -> Self {
        Self {
            state: Arc::new(Mutex::new((text.to_string(), 1))),
            writes: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn text(&self) -> String {
        self.state.lock().unwrap().0.clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    /// Simulate another writer modifying the document.
    pub fn external_edit(&self, text: &str) {
        let mut state = self.state.lock().unwrap();
        state.0 = text.to_string();
        state.1 += 1;
    }
}

#[async_trait::async_trait]
impl ArtifactStore for MemoryStore {
    async fn read(&self) -> Result<Artifact, HairpinError> {
        let state = self.state.lock().unwrap();
        Ok(Artifact {
            text: state.0.clone(),
            revision: Some(state.1.to_string()),
        })
    }

    async fn write(&self, current: &Artifact, text: &str) -> Result<(), HairpinError> {
        let mut state = self.state.lock().unwrap();
        if current.revision.as_deref() != Some(state.1.to_string().as_str()) {
            return Err(HairpinError::BackendConflict {
                namespace: "kube-system".to_string(),
                name: "coredns".to_string(),
            });
        }
        state.0 = text.to_string();
        state.1 += 1;
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory://kube-system/coredns".to_string()
    }
}

/// Resolver answering every name with a fixed address, or failing when `None`.
pub struct FixedResolver(pub Option<IpAddr>);

#[async_trait::async_trait]
impl AddressResolver for FixedResolver {
    async fn resolve(&self, name: &str) -> Result<IpAddr, HairpinError> {
        self.0.ok_or_else(|| HairpinError::Resolution {
            name: name.to_string(),
            reason: "NXDOMAIN".to_string(),
        })
    }
}
