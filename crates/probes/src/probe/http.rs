use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::time::Duration;

use url::Url;

use super::{IpFamily, Probe};
use crate::check::Check;
use crate::error::{ScanError, ValidationError};

/// HTTP reachability probe.
///
/// Issues a single GET request and compares the response status code to the
/// check's expectation. Certificate trust is deliberately not validated;
/// the check only asserts reachability and status.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    /// Build a probe pinned to one address family.
    ///
    /// The family is forced by binding the client to the family's
    /// unspecified local address, so `http6` checks never fall back to
    /// IPv4.
    pub fn new(family: IpFamily) -> reqwest::Result<Self> {
        let local_addr = match family {
            IpFamily::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpFamily::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };

        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .local_address(local_addr)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Probe for HttpProbe {
    fn sanitize(&self, mut check: Check) -> Result<Check, ValidationError> {
        if !check.target.starts_with("http") {
            // force a protocol scheme
            check.target = format!("http://{}", check.target);
        }

        Url::parse(&check.target).map_err(|source| ValidationError::InvalidUrl {
            target: check.target.clone(),
            source,
        })?;

        if check.expectation.parse::<u16>().is_err() {
            return Err(ValidationError::InvalidStatusCode(check.expectation.clone()));
        }

        Ok(check)
    }

    async fn scan(&self, check: &Check, timeout: Duration) -> Result<(), ScanError> {
        // sanitize already proved the expectation parses
        let expected: u16 = check.expectation.parse().unwrap_or_default();

        tracing::debug!(probe = %check.kind, target = %check.target, "request sent");
        let response = self
            .client
            .get(&check.target)
            .timeout(timeout)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ScanError::Timeout(timeout)
                } else {
                    ScanError::transport(&err)
                }
            })?;

        let code = response.status().as_u16();
        if code != expected {
            return Err(ScanError::UnexpectedStatus(code));
        }

        Ok(())
    }
}
