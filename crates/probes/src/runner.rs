use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::check::Check;
use crate::error::ScanError;
use crate::registry::Registry;
use crate::status::{Status, StatusList};

/// Explicit runner configuration, constructed once per process run and
/// read-only thereafter.
#[derive(Debug, Clone, Copy)]
pub struct RunnerConfig {
    /// Maximum number of scans in flight at once.
    pub concurrency: usize,

    /// Timeout applied uniformly to every scan.
    pub scan_timeout: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self { concurrency: 32, scan_timeout: Duration::from_secs(10) }
    }
}

/// Executes a check list with bounded concurrency.
///
/// Every check gets exactly one scan and exactly one [`Status`]; scan
/// failures become status outcomes, never runner errors.
pub struct Runner {
    registry: Arc<Registry>,
    config: RunnerConfig,
}

impl Runner {
    pub fn new(registry: Arc<Registry>, config: RunnerConfig) -> Self {
        Self { registry, config }
    }

    /// Run all checks and return the frozen status list.
    ///
    /// Returns only once every submitted scan has finished; a single slow
    /// scan delays the whole batch up to its own timeout, never beyond.
    /// The returned list has no guaranteed order.
    pub async fn run_all(&self, checks: Vec<Check>) -> StatusList {
        let gate = Arc::new(Semaphore::new(self.config.concurrency));
        let mut scans = JoinSet::new();

        for check in checks {
            let gate = Arc::clone(&gate);
            let registry = Arc::clone(&self.registry);
            let timeout = self.config.scan_timeout;

            scans.spawn(async move {
                // the gate is never closed, so acquire only fails on close
                let _permit = gate.acquire_owned().await.expect("semaphore closed");

                let outcome = match registry.get(&check.kind) {
                    Some(probe) => probe.scan(&check, timeout).await.err(),
                    None => Some(ScanError::UnknownKind(check.kind.clone())),
                };

                if let Some(err) = &outcome {
                    tracing::error!(probe = %check.kind, target = %check.target, error = %err, "scan failed");
                }

                Status::new(check, outcome)
            });
        }

        let mut statuses = Vec::with_capacity(scans.len());
        while let Some(scanned) = scans.join_next().await {
            match scanned {
                Ok(status) => statuses.push(status),
                Err(err) => tracing::error!(error = %err, "scan task aborted"),
            }
        }

        StatusList::from(statuses)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::check::Check;
    use crate::error::ValidationError;
    use crate::probe::Probe;

    /// Records how many scans run at once and fails on demand.
    struct InstrumentedProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        fail: bool,
    }

    impl InstrumentedProbe {
        fn new(fail: bool) -> Self {
            Self { in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0), fail }
        }
    }

    #[async_trait::async_trait]
    impl Probe for InstrumentedProbe {
        fn sanitize(&self, check: Check) -> Result<Check, ValidationError> {
            Ok(check)
        }

        async fn scan(&self, _check: &Check, _timeout: Duration) -> Result<(), ScanError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail { Err(ScanError::NoReply) } else { Ok(()) }
        }
    }

    fn runner_with(probe: Arc<InstrumentedProbe>, concurrency: usize) -> Runner {
        let mut probes: HashMap<&'static str, Arc<dyn Probe>> = HashMap::new();
        probes.insert("fake", probe);
        let registry = Arc::new(Registry::from_probes(probes));
        Runner::new(registry, RunnerConfig { concurrency, ..RunnerConfig::default() })
    }

    fn fake_checks(n: usize) -> Vec<Check> {
        (0..n).map(|i| Check::new("fake", format!("check-{i}"), "target", "0")).collect()
    }

    #[tokio::test]
    async fn concurrency_never_exceeds_the_limit() {
        let probe = Arc::new(InstrumentedProbe::new(false));
        let runner = runner_with(Arc::clone(&probe), 32);

        let statuses = runner.run_all(fake_checks(100)).await;

        assert_eq!(statuses.len(), 100);
        assert!(probe.peak.load(Ordering::SeqCst) <= 32);
        assert_eq!(probe.in_flight.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scan_errors_become_status_outcomes() {
        let probe = Arc::new(InstrumentedProbe::new(true));
        let runner = runner_with(probe, 4);

        let statuses = runner.run_all(fake_checks(3)).await;

        assert_eq!(statuses.len(), 3);
        assert_eq!(statuses.number_outages(), 3);
        for status in &statuses {
            assert!(matches!(status.outcome, Some(ScanError::NoReply)));
        }
    }

    #[tokio::test]
    async fn an_unregistered_kind_yields_a_failed_status() {
        let probe = Arc::new(InstrumentedProbe::new(false));
        let runner = runner_with(probe, 4);

        let statuses = runner.run_all(vec![Check::new("gopher", "Relic", "target", "0")]).await;

        assert_eq!(statuses.len(), 1);
        let status = statuses.iter().next().unwrap();
        assert!(matches!(&status.outcome, Some(ScanError::UnknownKind(kind)) if kind == "gopher"));
    }

    #[tokio::test]
    async fn an_empty_check_list_yields_an_empty_status_list() {
        let probe = Arc::new(InstrumentedProbe::new(false));
        let runner = runner_with(probe, 4);

        let statuses = runner.run_all(Vec::new()).await;
        assert!(statuses.is_empty());
    }
}
