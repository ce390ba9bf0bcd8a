// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Corefile patching.
//!
//! Owned `rewrite name` directives are placed as the first lines inside the
//! catch-all server block (`.:53 {`). A Corefile without that block has a shape
//! this controller does not understand, so patching fails instead of guessing.

use super::is_owned_line;
use crate::constants::{COREFILE_INDENT, MAIN_SERVER_BLOCK, OWNERSHIP_TAG, REWRITE_TARGET};
use crate::errors::HairpinError;
use crate::ingress::HostSet;

/// Build the owned rewrite directive for `host`.
#[must_use]
pub fn rewrite_line(host: &str) -> String {
    format!("{COREFILE_INDENT}rewrite name {host} {REWRITE_TARGET} {OWNERSHIP_TAG}")
}

/// Return `original` with exactly one rewrite directive per host in `hosts`.
///
/// Surrounding whitespace of the whole document is trimmed, previously owned
/// lines are removed, and the new directives are inserted right after the first
/// line opening the main server block, in the host set's sorted order. The new
/// directives reuse the anchor line's `\r` so CRLF Corefiles stay uniform.
///
/// # Errors
///
/// Returns [`HairpinError::ConfigAnchorMissing`] if no line opens the main server
/// block. `original` is never partially rewritten.
pub fn patch_corefile(original: &str, hosts: &HostSet) -> Result<String, HairpinError> {
    let mut lines: Vec<&str> = original
        .trim()
        .split('\n')
        .filter(|line| !is_owned_line(line))
        .collect();

    let anchor = lines
        .iter()
        .position(|line| line.trim().starts_with(MAIN_SERVER_BLOCK))
        .ok_or_else(|| HairpinError::ConfigAnchorMissing {
            anchor: MAIN_SERVER_BLOCK.to_string(),
            line_count: lines.len(),
        })?;

    let eol = if lines[anchor].ends_with('\r') { "\r" } else { "" };
    let rewrites: Vec<String> = hosts
        .iter()
        .map(|host| format!("{}{eol}", rewrite_line(host)))
        .collect();
    lines.splice(anchor + 1..anchor + 1, rewrites.iter().map(String::as_str));

    Ok(lines.join("\n"))
}

#[cfg(test)]
#[path = "corefile_tests.rs"]
mod corefile_tests;
