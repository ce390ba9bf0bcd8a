// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Name-to-address lookup for the rewrite target in hosts-file mode.

use crate::api::bounded;
use crate::errors::HairpinError;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::debug;

/// Resolves a hostname to a single address.
#[async_trait::async_trait]
pub trait AddressResolver: Send + Sync {
    /// # Errors
    ///
    /// Returns [`HairpinError::Resolution`] if `name` has no usable address.
    async fn resolve(&self, name: &str) -> Result<IpAddr, HairpinError>;
}

/// [`AddressResolver`] using the system resolver, bounded by a timeout.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    timeout: Duration,
}

impl SystemResolver {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait::async_trait]
impl AddressResolver for SystemResolver {
    async fn resolve(&self, name: &str) -> Result<IpAddr, HairpinError> {
        let operation = format!("resolve {name}");
        let addresses: Vec<SocketAddr> = bounded(&operation, self.timeout, async {
            tokio::net::lookup_host((name, 0))
                .await
                .map(|found| found.collect())
                .map_err(|e| HairpinError::Resolution {
                    name: name.to_string(),
                    reason: e.to_string(),
                })
        })
        .await?;

        let address = pick_address(addresses.iter().map(SocketAddr::ip)).ok_or_else(|| {
            HairpinError::Resolution {
                name: name.to_string(),
                reason: "no addresses returned".to_string(),
            }
        })?;

        debug!(name = %name, address = %address, "Resolved rewrite target");
        Ok(address)
    }
}

/// First IPv4 address, falling back to the first address of any family.
#[must_use]
pub fn pick_address<I>(addresses: I) -> Option<IpAddr>
where
    I: IntoIterator<Item = IpAddr>,
{
    let mut first = None;
    for address in addresses {
        if address.is_ipv4() {
            return Some(address);
        }
        first.get_or_insert(address);
    }
    first
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_address_prefers_ipv4() {
        let v6: IpAddr = "fd00::1".parse().unwrap();
        let v4: IpAddr = "10.96.0.12".parse().unwrap();

        assert_eq!(pick_address([v6, v4]), Some(v4));
        assert_eq!(pick_address([v6]), Some(v6));
        assert_eq!(pick_address(Vec::new()), None);
    }

    #[tokio::test]
    async fn test_resolves_ip_literal() {
        let resolver = SystemResolver::new(Duration::from_secs(5));

        let address = resolver.resolve("127.0.0.1").await.unwrap();

        assert_eq!(address, "127.0.0.1".parse::<IpAddr>().unwrap());
    }
}
