use std::io;
use std::time::Duration;

use tokio::net::TcpStream;

use super::{IpFamily, Probe, resolve};
use crate::check::Check;
use crate::error::{ScanError, ValidationError};

/// TCP port reachability probe.
///
/// An expectation of `0` means the port must accept a connection, any
/// other value means it must not. A dial timeout counts as "closed": it
/// satisfies the closed expectation, while a timeout when the port was
/// expected open is still a failure. Any non-timeout dial error is a
/// failure regardless of the expectation.
pub struct TcpProbe {
    family: IpFamily,
}

impl TcpProbe {
    pub fn new(family: IpFamily) -> Self {
        Self { family }
    }
}

#[async_trait::async_trait]
impl Probe for TcpProbe {
    fn sanitize(&self, mut check: Check) -> Result<Check, ValidationError> {
        if check.expectation.parse::<i32>().is_err() {
            return Err(ValidationError::InvalidReturnCode(check.expectation.clone()));
        }

        let mut fields = check.target.split_whitespace();
        let (host, port) = match (fields.next(), fields.next(), fields.next()) {
            (Some(host), Some(port), None) if port.parse::<u16>().is_ok() => (host, port),
            _ => return Err(ValidationError::InvalidPortTarget(check.target.clone())),
        };

        check.target = format!("{host}:{port}");
        Ok(check)
    }

    async fn scan(&self, check: &Check, timeout: Duration) -> Result<(), ScanError> {
        // sanitize already proved the expectation parses
        let should_be_open = check.expectation.parse::<i32>().unwrap_or_default() == 0;
        let (host, port) = split_target(&check.target);
        let addr = resolve(host, port, self.family).await?;

        tracing::debug!(probe = %check.kind, target = %check.target, "port scan sent");
        let dial = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Dial::Connected,
            Ok(Err(err)) => Dial::Failed(err),
            Err(_elapsed) => Dial::TimedOut,
        };

        judge(dial, should_be_open, host, port, timeout)
    }
}

enum Dial {
    Connected,
    Failed(io::Error),
    TimedOut,
}

fn judge(
    dial: Dial,
    should_be_open: bool,
    host: &str,
    port: u16,
    timeout: Duration,
) -> Result<(), ScanError> {
    match dial {
        Dial::Connected if should_be_open => Ok(()),
        Dial::Connected => Err(ScanError::PortOpen { host: host.to_string(), port }),
        // a refused or otherwise failed dial is a failure even when the
        // port was expected closed; only a timeout counts as "closed"
        Dial::Failed(err) => Err(ScanError::transport(&err)),
        Dial::TimedOut if should_be_open => Err(ScanError::Timeout(timeout)),
        Dial::TimedOut => Ok(()),
    }
}

/// Split a sanitized `host:port` target back into its parts.
fn split_target(target: &str) -> (&str, u16) {
    match target.rsplit_once(':') {
        Some((host, port)) => (host, port.parse().unwrap_or_default()),
        None => (target, 0),
    }
}
