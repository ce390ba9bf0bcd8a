// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Helpers for Kubernetes API calls.
//!
//! - [`list_all_paginated`] fetches large result sets page by page
//! - [`bounded`] puts a hard time limit on any single call so a stalled
//!   connection cannot wedge the reconciliation loop
//! - [`is_not_found`] / [`is_conflict`] classify API status codes

use crate::constants::KUBE_LIST_PAGE_SIZE;
use crate::errors::HairpinError;
use kube::{api::ListParams, Api};
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// List all resources with automatic pagination.
///
/// Works for typed resources as well as `DynamicObject`, which is how every
/// `Ingress` API version is listed.
///
/// # Errors
///
/// Returns the first `kube::Error` encountered; no partial result is returned.
pub async fn list_all_paginated<K>(
    api: &Api<K>,
    mut list_params: ListParams,
) -> Result<Vec<K>, kube::Error>
where
    K: Clone + DeserializeOwned + Debug,
{
    list_params.limit = Some(KUBE_LIST_PAGE_SIZE);

    let mut all_items = Vec::new();
    let mut page_count = 0;

    loop {
        page_count += 1;
        let result = api.list(&list_params).await?;

        let item_count = result.items.len();
        all_items.extend(result.items);

        debug!(
            page = page_count,
            items_in_page = item_count,
            total_items = all_items.len(),
            "Fetched page from Kubernetes API"
        );

        match result.metadata.continue_ {
            Some(token) if !token.is_empty() => list_params.continue_token = Some(token),
            _ => break,
        }
    }

    Ok(all_items)
}

/// Run `call` with an upper bound on its duration.
///
/// # Errors
///
/// Returns [`HairpinError::Timeout`] if `limit` elapses first, otherwise whatever
/// `call` returns.
pub async fn bounded<T, F>(operation: &str, limit: Duration, call: F) -> Result<T, HairpinError>
where
    F: Future<Output = Result<T, HairpinError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(HairpinError::Timeout {
            operation: operation.to_string(),
            timeout_secs: limit.as_secs(),
        }),
    }
}

/// Whether the API server answered 404.
#[must_use]
pub fn is_not_found(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 404)
}

/// Whether the API server rejected a write because of a stale `resourceVersion`.
#[must_use]
pub fn is_conflict(err: &kube::Error) -> bool {
    matches!(err, kube::Error::Api(ae) if ae.code == 409)
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
