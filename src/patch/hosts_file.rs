// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Node hosts file patching.
//!
//! All hairpinned hosts share a single owned line mapping them to the proxy's
//! address. The file is only rewritten when the set of owned lines differs from
//! that one expected line, so manual edits to foreign lines never trigger churn.

use super::is_owned_line;
use crate::constants::OWNERSHIP_TAG;
use crate::ingress::HostSet;
use std::collections::BTreeSet;
use std::net::IpAddr;

/// Build the owned line mapping every host in `hosts` to `address`.
///
/// Returns `None` for an empty host set, since a hosts entry without names is
/// not valid.
#[must_use]
pub fn hosts_line(address: IpAddr, hosts: &HostSet) -> Option<String> {
    if hosts.is_empty() {
        return None;
    }
    let names: Vec<&str> = hosts.iter().collect();
    Some(format!("{address}\t{} {OWNERSHIP_TAG}", names.join(" ")))
}

/// Split on `\n` only, so foreign lines keep any `\r` they carry.
fn split_lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        return Vec::new();
    }
    text.strip_suffix('\n').unwrap_or(text).split('\n').collect()
}

/// Return `original` with one owned line pointing `hosts` at `address`.
///
/// If the owned lines already present are exactly the expected line, `original`
/// is returned verbatim. Otherwise the result is the foreign lines in their
/// original order followed by the owned line, each newline-terminated.
#[must_use]
pub fn patch_hosts_file(original: &str, hosts: &HostSet, address: IpAddr) -> String {
    let (owned, foreign): (Vec<&str>, Vec<&str>) = split_lines(original)
        .into_iter()
        .partition(|line| is_owned_line(line));

    let candidate = hosts_line(address, hosts);

    let existing: BTreeSet<&str> = owned.iter().map(|line| line.trim_end()).collect();
    let expected: BTreeSet<&str> = candidate.iter().map(String::as_str).collect();
    if existing == expected {
        return original.to_string();
    }

    let mut patched = String::with_capacity(original.len());
    for line in foreign.into_iter().chain(candidate.as_deref()) {
        patched.push_str(line);
        patched.push('\n');
    }
    patched
}

#[cfg(test)]
#[path = "hosts_file_tests.rs"]
mod hosts_file_tests;
