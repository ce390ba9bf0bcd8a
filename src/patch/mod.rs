// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Pure text transforms for the artifacts this controller owns lines in.
//!
//! Both patchers follow the same contract: lines ending with
//! [`OWNERSHIP_TAG`](crate::constants::OWNERSHIP_TAG) are regenerated from the
//! current [`HostSet`](crate::ingress::HostSet); every other line is kept
//! byte-for-byte in its original order. Patching a patcher's own output with the
//! same inputs is a no-op.

pub mod corefile;
pub mod hosts_file;

pub use corefile::patch_corefile;
pub use hosts_file::patch_hosts_file;

use crate::constants::OWNERSHIP_TAG;

/// Whether `line` was generated by this controller.
#[must_use]
pub fn is_owned_line(line: &str) -> bool {
    line.trim().ends_with(OWNERSHIP_TAG)
}
