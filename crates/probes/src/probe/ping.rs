use std::net::IpAddr;
use std::time::Duration;

use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError};

use super::{IpFamily, Probe, resolve};
use crate::check::Check;
use crate::error::{ScanError, ValidationError};

const ECHO_PAYLOAD: [u8; 56] = [0; 56];

/// ICMP reachability probe.
///
/// Sends exactly one echo request and judges the outcome by whether a reply
/// came back, not by raw socket errors: an expectation of `0` means the
/// target must answer, any other value means it must not. `ping6` is not
/// supported and always scans as failed.
#[derive(Debug, Default)]
pub struct PingProbe;

#[async_trait::async_trait]
impl Probe for PingProbe {
    fn sanitize(&self, check: Check) -> Result<Check, ValidationError> {
        if check.expectation.parse::<i32>().is_err() {
            return Err(ValidationError::InvalidReturnCode(check.expectation.clone()));
        }

        Ok(check)
    }

    async fn scan(&self, check: &Check, timeout: Duration) -> Result<(), ScanError> {
        if check.kind == "ping6" {
            return Err(ScanError::Ping6Unsupported);
        }

        let should_reply = check.expectation.parse::<i32>().unwrap_or_default() == 0;
        let addr = resolve(&check.target, 0, IpFamily::V4).await?;

        tracing::debug!(probe = %check.kind, target = %check.target, "ping sent");
        let replied = match echo(addr.ip(), timeout).await {
            Ok(replied) => replied,
            // socket or send errors only matter when a reply was expected;
            // an unreachable target is indistinguishable from one we could
            // not even probe
            Err(err) if should_reply => return Err(err),
            Err(_) => false,
        };

        match (should_reply, replied) {
            (true, false) => Err(ScanError::NoReply),
            (false, true) => Err(ScanError::UnexpectedReply { target: check.target.clone() }),
            _ => Ok(()),
        }
    }
}

/// Send one echo request and report whether a reply arrived in time.
async fn echo(addr: IpAddr, timeout: Duration) -> Result<bool, ScanError> {
    let client = Client::new(&Config::default()).map_err(|err| ScanError::transport(&err))?;
    let mut pinger = client.pinger(addr, PingIdentifier(rand::random())).await;
    pinger.timeout(timeout);

    match pinger.ping(PingSequence(0), &ECHO_PAYLOAD).await {
        Ok((_reply, _rtt)) => Ok(true),
        Err(SurgeError::Timeout { .. }) => Ok(false),
        Err(err) => Err(ScanError::transport(&err)),
    }
}
