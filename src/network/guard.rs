//! Private-network (SSRF) guard.
//!
//! A target is blocked when its host is a literal private, loopback or
//! link-local address, or when DNS resolution yields one. Resolution failure
//! is not an error: the guard allows and leaves the verdict to the fetch.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use tracing::debug;
use url::{Host, Url};

use crate::error::{Error, Result};

/// Whether an address belongs to a private, loopback, link-local or
/// unspecified range.
#[must_use]
pub fn is_private_ip(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    ip.is_private() || ip.is_loopback() || ip.is_link_local() || ip.is_unspecified()
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(mapped) = ip.to_ipv4_mapped() {
        return is_private_v4(mapped);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link-local
        || (first & 0xffc0) == 0xfe80
}

/// Literal IP host of a URL, if the host is an address rather than a name.
#[must_use]
pub fn literal_ip(url: &Url) -> Option<IpAddr> {
    match url.host()? {
        Host::Ipv4(v4) => Some(IpAddr::V4(v4)),
        Host::Ipv6(v6) => Some(IpAddr::V6(v6)),
        Host::Domain(_) => None,
    }
}

/// Reject targets that point into private networks.
///
/// Must run before any request for `url` is issued.
pub async fn guard_url(url: &Url) -> Result<()> {
    let host = url.host_str().unwrap_or_default().to_string();

    if let Some(ip) = literal_ip(url) {
        return check_address(&host, ip);
    }

    let port = url.port_or_known_default().unwrap_or(80);
    let resolved = match tokio::net::lookup_host((host.as_str(), port)).await {
        Ok(addrs) => {
            for addr in addrs {
                check_address(&host, addr.ip())?;
            }
            Ok(())
        }
        Err(err) => {
            debug!(host = %host, error = %err, "DNS resolution failed; deferring to fetch");
            Ok(())
        }
    };
    resolved
}

fn check_address(host: &str, address: IpAddr) -> Result<()> {
    if is_private_ip(address) {
        return Err(Error::BlockedHost {
            host: host.to_string(),
            address,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn private_ipv4_ranges_are_blocked() {
        for addr in [
            "10.0.0.1",
            "172.16.5.4",
            "172.31.255.255",
            "192.168.1.1",
            "127.0.0.1",
            "169.254.169.254",
            "0.0.0.0",
        ] {
            assert!(is_private_ip(ip(addr)), "{addr}");
        }
    }

    #[test]
    fn public_ipv4_is_allowed() {
        for addr in ["8.8.8.8", "172.32.0.1", "93.184.216.34", "192.169.0.1"] {
            assert!(!is_private_ip(ip(addr)), "{addr}");
        }
    }

    #[test]
    fn private_ipv6_ranges_are_blocked() {
        for addr in ["::1", "fc00::1", "fd12:3456::1", "fe80::1", "::ffff:127.0.0.1", "::"] {
            assert!(is_private_ip(ip(addr)), "{addr}");
        }
        assert!(!is_private_ip(ip("2606:4700:4700::1111")));
    }

    #[tokio::test]
    async fn literal_loopback_is_rejected() {
        let url = Url::parse("http://127.0.0.1:8080/admin").unwrap();
        let err = guard_url(&url).await.expect_err("loopback must be blocked");
        assert!(matches!(err, Error::BlockedHost { .. }));

        let url = Url::parse("http://[::1]/").unwrap();
        assert!(matches!(guard_url(&url).await, Err(Error::BlockedHost { .. })));
    }

    #[tokio::test]
    async fn hostname_resolving_to_loopback_is_rejected() {
        let url = Url::parse("http://localhost/").unwrap();
        match guard_url(&url).await {
            Err(Error::BlockedHost { address, .. }) => assert!(address.is_loopback()),
            other => panic!("expected BlockedHost, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unresolvable_host_is_allowed() {
        let url = Url::parse("https://does-not-exist.invalid/").unwrap();
        assert!(guard_url(&url).await.is_ok());
    }
}
