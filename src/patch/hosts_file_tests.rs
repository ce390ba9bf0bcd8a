// Copyright (c) 2025 hairpin-proxy contributors
// SPDX-License-Identifier: MIT

//! Unit tests for `hosts_file.rs`

#[cfg(test)]
mod tests {
    use crate::ingress::HostSet;
    use crate::patch::hosts_file::{hosts_line, patch_hosts_file};
    use std::net::{IpAddr, Ipv4Addr};

    const PROXY: IpAddr = IpAddr::V4(Ipv4Addr::new(10, 0, 0, 5));

    const DOCKER_HOSTS: &str = "127.0.0.1\tlocalhost
::1\tlocalhost ip6-localhost ip6-loopback
fe00::0\tip6-localnet
ff00::0\tip6-mcastprefix
10.244.1.7\tnode-agent-x2b7c
";

    fn host_set(hosts: &[&str]) -> HostSet {
        hosts.iter().copied().collect()
    }

    #[test]
    fn test_hosts_line_format() {
        assert_eq!(
            hosts_line(PROXY, &host_set(&["b.com", "a.com"])).as_deref(),
            Some("10.0.0.5\ta.com b.com # Added by hairpin-proxy")
        );
        assert_eq!(hosts_line(PROXY, &HostSet::new()), None);
    }

    #[test]
    fn test_appends_owned_line_after_foreign_lines() {
        let patched = patch_hosts_file("127.0.0.1 localhost", &host_set(&["a.com"]), PROXY);

        assert_eq!(
            patched,
            "127.0.0.1 localhost\n10.0.0.5\ta.com # Added by hairpin-proxy\n"
        );
    }

    #[test]
    fn test_repatching_returns_input_unchanged() {
        let hosts = host_set(&["a.com"]);
        let once = patch_hosts_file("127.0.0.1 localhost", &hosts, PROXY);

        let twice = patch_hosts_file(&once, &hosts, PROXY);

        assert_eq!(twice, once);
    }

    #[test]
    fn test_owned_line_position_is_not_churned() {
        let original = "10.0.0.5\ta.com b.com # Added by hairpin-proxy\n127.0.0.1 localhost\n# manual note";

        let patched = patch_hosts_file(original, &host_set(&["a.com", "b.com"]), PROXY);

        assert_eq!(patched, original);
    }

    #[test]
    fn test_duplicate_owned_lines_collapse_without_churn() {
        let owned = "10.0.0.5\ta.com # Added by hairpin-proxy";
        let original = format!("{owned}\n127.0.0.1 localhost\n{owned}\n");

        let patched = patch_hosts_file(&original, &host_set(&["a.com"]), PROXY);

        assert_eq!(patched, original, "set equality ignores duplicates");
    }

    #[test]
    fn test_changed_hosts_replace_owned_line() {
        let hosts = host_set(&["a.com"]);
        let once = patch_hosts_file(DOCKER_HOSTS, &hosts, PROXY);

        let updated = patch_hosts_file(&once, &host_set(&["a.com", "c.com"]), PROXY);

        assert_eq!(
            updated,
            format!("{DOCKER_HOSTS}10.0.0.5\ta.com c.com # Added by hairpin-proxy\n")
        );
    }

    #[test]
    fn test_changed_address_replaces_owned_line() {
        let hosts = host_set(&["a.com"]);
        let once = patch_hosts_file(DOCKER_HOSTS, &hosts, PROXY);

        let moved = patch_hosts_file(&once, &hosts, IpAddr::V4(Ipv4Addr::new(10, 0, 0, 9)));

        assert!(moved.ends_with("10.0.0.9\ta.com # Added by hairpin-proxy\n"));
        assert!(!moved.contains("10.0.0.5"));
    }

    #[test]
    fn test_foreign_lines_preserved_byte_for_byte() {
        let original = "127.0.0.1 localhost\r\n\n# comment  \n10.0.0.5\told.com # Added by hairpin-proxy\n192.168.1.1 router";

        let patched = patch_hosts_file(original, &host_set(&["new.com"]), PROXY);

        assert_eq!(
            patched,
            "127.0.0.1 localhost\r\n\n# comment  \n192.168.1.1 router\n10.0.0.5\tnew.com # Added by hairpin-proxy\n"
        );
    }

    #[test]
    fn test_empty_host_set_removes_owned_line() {
        let once = patch_hosts_file(DOCKER_HOSTS, &host_set(&["a.com"]), PROXY);

        let cleaned = patch_hosts_file(&once, &HostSet::new(), PROXY);

        assert_eq!(cleaned, DOCKER_HOSTS);
    }

    #[test]
    fn test_empty_host_set_without_owned_lines_is_untouched() {
        let original = "127.0.0.1 localhost";
        assert_eq!(patch_hosts_file(original, &HostSet::new(), PROXY), original);
    }

    #[test]
    fn test_empty_file_gets_owned_line() {
        assert_eq!(
            patch_hosts_file("", &host_set(&["a.com"]), PROXY),
            "10.0.0.5\ta.com # Added by hairpin-proxy\n"
        );
    }

    #[test]
    fn test_ipv6_address() {
        let address: IpAddr = "fd00::5".parse().unwrap();
        let patched = patch_hosts_file("", &host_set(&["a.com"]), address);
        assert_eq!(patched, "fd00::5\ta.com # Added by hairpin-proxy\n");
    }
}
