// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Backing stores for patched artifacts and the change detector that writes to them.
//!
//! A store is read fresh at the start of every cycle and written at most once per
//! cycle, always with the complete document.
//!
//! - [`ConfigMapStore`] - one data key of the cluster DNS `ConfigMap`
//! - [`HostsFileStore`] - a node-local hosts file

use crate::api::{bounded, is_conflict, is_not_found};
use crate::config::ConfigMapTarget;
use crate::errors::HairpinError;
use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// Snapshot of an artifact as read from its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Full document text
    pub text: String,
    /// Store-specific version token used to detect concurrent writers
    pub revision: Option<String>,
}

/// Outcome of [`apply_if_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Old and new text were equal ignoring surrounding whitespace
    Unchanged,
    /// The new text was written to the store
    Updated,
}

/// Whole-document read/write access to a patched artifact.
#[async_trait::async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Read the current document.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource or file cannot be read.
    async fn read(&self) -> Result<Artifact, HairpinError>;

    /// Replace the document read as `current` with `text`.
    ///
    /// # Errors
    ///
    /// Returns [`HairpinError::BackendConflict`] if the store changed since
    /// `current` was read, or another error if the write fails.
    async fn write(&self, current: &Artifact, text: &str) -> Result<(), HairpinError>;

    /// Human-readable location of the artifact for logs.
    fn describe(&self) -> String;
}

/// Write `new_text` to `store` unless it matches `current` ignoring surrounding whitespace.
///
/// # Errors
///
/// Propagates any error from [`ArtifactStore::write`].
pub async fn apply_if_changed<S>(
    current: &Artifact,
    new_text: &str,
    store: &S,
) -> Result<ApplyOutcome, HairpinError>
where
    S: ArtifactStore + ?Sized,
{
    if current.text.trim() == new_text.trim() {
        debug!(target_artifact = %store.describe(), "Artifact unchanged");
        return Ok(ApplyOutcome::Unchanged);
    }

    info!(target_artifact = %store.describe(), "Artifact changed, updating");
    debug!("New content:\n{new_text}");

    store.write(current, new_text).await?;
    Ok(ApplyOutcome::Updated)
}

/// [`ArtifactStore`] for one data key of a `ConfigMap`.
///
/// Writes are JSON merge patches touching only the configured key, carrying the
/// `resourceVersion` observed at read time so a concurrent update is rejected with
/// HTTP 409 instead of being overwritten.
#[derive(Clone)]
pub struct ConfigMapStore {
    api: Api<ConfigMap>,
    target: ConfigMapTarget,
    timeout: Duration,
}

impl ConfigMapStore {
    #[must_use]
    pub fn new(client: Client, target: ConfigMapTarget, timeout: Duration) -> Self {
        let api = Api::namespaced(client, &target.namespace);
        Self {
            api,
            target,
            timeout,
        }
    }
}

/// Merge patch replacing `key` with `text`, guarded by the observed `resourceVersion`.
pub(crate) fn configmap_patch(
    key: &str,
    text: &str,
    revision: Option<&str>,
) -> serde_json::Value {
    let mut data = serde_json::Map::new();
    data.insert(key.to_string(), json!(text));
    json!({
        "metadata": { "resourceVersion": revision },
        "data": data,
    })
}

/// Map a failed `ConfigMap` call: 404 on read is a missing `ConfigMap`, 409 on
/// write is a concurrent modification.
pub(crate) fn configmap_error(
    target: &ConfigMapTarget,
    operation: &str,
    source: kube::Error,
) -> HairpinError {
    match operation {
        "get" if is_not_found(&source) => HairpinError::ConfigMapNotFound {
            namespace: target.namespace.clone(),
            name: target.name.clone(),
        },
        "update" if is_conflict(&source) => HairpinError::BackendConflict {
            namespace: target.namespace.clone(),
            name: target.name.clone(),
        },
        _ => HairpinError::Kube {
            operation: format!("{operation} ConfigMap {}/{}", target.namespace, target.name),
            source,
        },
    }
}

#[async_trait::async_trait]
impl ArtifactStore for ConfigMapStore {
    async fn read(&self) -> Result<Artifact, HairpinError> {
        let operation = format!("get ConfigMap {}", self.describe());
        let configmap = bounded(&operation, self.timeout, async {
            self.api
                .get(&self.target.name)
                .await
                .map_err(|source| configmap_error(&self.target, "get", source))
        })
        .await?;

        let text = configmap
            .data
            .as_ref()
            .and_then(|data| data.get(&self.target.key))
            .cloned()
            .ok_or_else(|| HairpinError::ConfigMapKeyMissing {
                namespace: self.target.namespace.clone(),
                name: self.target.name.clone(),
                key: self.target.key.clone(),
            })?;

        Ok(Artifact {
            text,
            revision: configmap.metadata.resource_version,
        })
    }

    async fn write(&self, current: &Artifact, text: &str) -> Result<(), HairpinError> {
        let patch = configmap_patch(&self.target.key, text, current.revision.as_deref());

        let operation = format!("update ConfigMap {}", self.describe());
        bounded(&operation, self.timeout, async {
            self.api
                .patch(&self.target.name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
                .map_err(|source| configmap_error(&self.target, "update", source))
        })
        .await?;

        info!(configmap = %self.describe(), key = %self.target.key, "Updated ConfigMap");
        Ok(())
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.target.namespace, self.target.name)
    }
}

/// [`ArtifactStore`] for a hosts file on the local filesystem.
#[derive(Debug, Clone)]
pub struct HostsFileStore {
    path: PathBuf,
}

impl HostsFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn io_error(&self, source: std::io::Error) -> HairpinError {
        HairpinError::HostsFileIo {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait::async_trait]
impl ArtifactStore for HostsFileStore {
    async fn read(&self) -> Result<Artifact, HairpinError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        Ok(Artifact {
            text,
            revision: None,
        })
    }

    // Written in place rather than via rename: container hosts files are bind mounts.
    async fn write(&self, _current: &Artifact, text: &str) -> Result<(), HairpinError> {
        tokio::fs::write(&self.path, text)
            .await
            .map_err(|e| self.io_error(e))?;
        info!(path = %self.path.display(), "Updated hosts file");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod store_tests;
