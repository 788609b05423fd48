use std::time::Duration;

use thiserror::Error;

use crate::probe::IpFamily;

/// A check is malformed for its protocol.
///
/// Raised synchronously by a probe's `sanitize`, never by a network
/// condition. A check that fails validation is excluded from the run.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("invalid expected status code '{0}': should be a number")]
    InvalidStatusCode(String),

    #[error("invalid expected return code '{0}': should be a number")]
    InvalidReturnCode(String),

    #[error("invalid target '{target}'")]
    InvalidUrl {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid target '{0}': should be formatted like '<host> <port>'")]
    InvalidPortTarget(String),
}

/// The failure outcome of a single probe scan.
///
/// Scan errors are values, not process failures: the runner attaches them
/// to the check's [`Status`](crate::Status) and the run continues.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Transport-level failure, already reduced to its deepest cause so the
    /// rendered page doesn't show wrapping noise.
    #[error("{0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected status code: {0}")]
    UnexpectedStatus(u16),

    #[error("ping6 is not supported")]
    Ping6Unsupported,

    #[error("no packet received")]
    NoReply,

    #[error("'{target}' answered the echo while it was expected to be unreachable")]
    UnexpectedReply { target: String },

    #[error("connect to {host} port {port} succeeded while the port was expected to be closed")]
    PortOpen { host: String, port: u16 },

    #[error("no {family} address found for '{host}'")]
    NoAddress { family: IpFamily, host: String },

    #[error("no probe registered for kind '{0}'")]
    UnknownKind(String),
}

impl ScanError {
    /// Wrap a transport error, keeping only its deepest cause.
    pub fn transport(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::Transport(root_cause(err).to_string())
    }
}

/// Walk an error's source chain down to its origin.
pub fn root_cause(err: &(dyn std::error::Error + 'static)) -> &(dyn std::error::Error + 'static) {
    let mut cause = err;
    while let Some(source) = cause.source() {
        cause = source;
    }
    cause
}
