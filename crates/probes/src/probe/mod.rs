use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::check::Check;
use crate::error::{ScanError, ValidationError};

pub mod http;
pub mod ping;
pub mod tcp;

pub use http::HttpProbe;
pub use ping::PingProbe;
pub use tcp::TcpProbe;

/// Address family a probe is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    pub fn matches(self, ip: IpAddr) -> bool {
        match self {
            IpFamily::V4 => ip.is_ipv4(),
            IpFamily::V6 => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for IpFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "IPv4"),
            IpFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// The protocol-specific validation and execution strategy for a check kind.
///
/// `sanitize` is pure: it normalizes the check's target and rejects
/// malformed expectations without touching the network. `scan` performs
/// exactly one network attempt bounded by the caller's timeout; there is no
/// retry, a single attempt is authoritative for the run.
#[async_trait::async_trait]
pub trait Probe: Send + Sync {
    /// Normalize and validate a raw check for this protocol.
    fn sanitize(&self, check: Check) -> Result<Check, ValidationError>;

    /// Perform one network attempt against the check's target.
    async fn scan(&self, check: &Check, timeout: Duration) -> Result<(), ScanError>;
}

/// Resolve `host` and keep the first address of the wanted family.
///
/// Resolution failures are transport errors; a name that resolves but has
/// no address of the family is reported distinctly.
pub(crate) async fn resolve(
    host: &str,
    port: u16,
    family: IpFamily,
) -> Result<SocketAddr, ScanError> {
    let addrs = tokio::net::lookup_host((host, port))
        .await
        .map_err(|err| ScanError::transport(&err))?;

    addrs
        .into_iter()
        .find(|addr| family.matches(addr.ip()))
        .ok_or_else(|| ScanError::NoAddress { family, host: host.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_matches_only_its_own_addresses() {
        let v4: IpAddr = "127.0.0.1".parse().unwrap();
        let v6: IpAddr = "::1".parse().unwrap();
        assert!(IpFamily::V4.matches(v4));
        assert!(!IpFamily::V4.matches(v6));
        assert!(IpFamily::V6.matches(v6));
        assert!(!IpFamily::V6.matches(v4));
    }

    #[tokio::test]
    async fn resolve_filters_by_family() {
        let addr = resolve("127.0.0.1", 80, IpFamily::V4).await.unwrap();
        assert!(addr.is_ipv4());
        assert_eq!(addr.port(), 80);

        let err = resolve("127.0.0.1", 80, IpFamily::V6).await.unwrap_err();
        assert!(matches!(err, ScanError::NoAddress { family: IpFamily::V6, .. }));
    }
}
