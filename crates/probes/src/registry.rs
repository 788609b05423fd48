use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;

use crate::probe::{HttpProbe, IpFamily, PingProbe, Probe, TcpProbe};

/// Every kind the registry recognizes, already lower-cased.
pub const KINDS: [&str; 11] =
    ["http", "http4", "http6", "ping", "ping4", "tcp", "tcp4", "tcp6", "port", "port4", "port6"];

/// Immutable mapping from protocol kind to probe instance.
///
/// Built once per process and never mutated afterwards; probe instances are
/// shared between alias kinds. Lookups expect already lower-cased keys, so
/// normalizing is the check-construction boundary's job, as is rejecting
/// unknown kinds.
pub struct Registry {
    probes: HashMap<&'static str, Arc<dyn Probe>>,
}

impl Registry {
    /// Build the default probe set.
    ///
    /// Plain `http`, `ping` and `tcp` are the IPv4 variants; `port*` are
    /// legacy aliases for `tcp*`.
    pub fn new() -> Result<Self> {
        let http4: Arc<dyn Probe> = Arc::new(HttpProbe::new(IpFamily::V4)?);
        let http6: Arc<dyn Probe> = Arc::new(HttpProbe::new(IpFamily::V6)?);
        let ping: Arc<dyn Probe> = Arc::new(PingProbe);
        let tcp4: Arc<dyn Probe> = Arc::new(TcpProbe::new(IpFamily::V4));
        let tcp6: Arc<dyn Probe> = Arc::new(TcpProbe::new(IpFamily::V6));

        let mut probes: HashMap<&'static str, Arc<dyn Probe>> = HashMap::new();
        probes.insert("http", Arc::clone(&http4));
        probes.insert("http4", http4);
        probes.insert("http6", http6);
        probes.insert("ping", Arc::clone(&ping));
        probes.insert("ping4", ping);
        probes.insert("tcp", Arc::clone(&tcp4));
        probes.insert("tcp4", Arc::clone(&tcp4));
        probes.insert("tcp6", Arc::clone(&tcp6));
        probes.insert("port", Arc::clone(&tcp4));
        probes.insert("port4", tcp4);
        probes.insert("port6", tcp6);

        Ok(Self { probes })
    }

    #[cfg(test)]
    pub(crate) fn from_probes(probes: HashMap<&'static str, Arc<dyn Probe>>) -> Self {
        Self { probes }
    }

    /// Look up the probe for an already lower-cased kind.
    pub fn get(&self, kind: &str) -> Option<Arc<dyn Probe>> {
        self.probes.get(kind).cloned()
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.probes.contains_key(kind)
    }
}
