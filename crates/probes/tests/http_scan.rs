use std::sync::Arc;
use std::time::Duration;

use httpmock::prelude::*;
use probes::{Check, Registry, Runner, RunnerConfig};

fn runner(registry: &Arc<Registry>) -> Runner {
    let config =
        RunnerConfig { scan_timeout: Duration::from_secs(5), ..RunnerConfig::default() };
    Runner::new(Arc::clone(registry), config)
}

#[tokio::test]
async fn matching_status_code_succeeds() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(200);
        })
        .await;

    let registry = Arc::new(Registry::new().unwrap());
    let probe = registry.get("http").unwrap();

    // a bare host:port target exercises the scheme prefixing too
    let check = probe
        .sanitize(Check::new("http", "Mock", server.address().to_string(), "200"))
        .unwrap();
    assert!(check.target.starts_with("http://"));

    let statuses = runner(&registry).run_all(vec![check]).await;
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses.number_outages(), 0);
}

#[tokio::test]
async fn mismatching_status_code_reports_the_received_code() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/");
            then.status(503);
        })
        .await;

    let registry = Arc::new(Registry::new().unwrap());
    let probe = registry.get("http").unwrap();

    let check = probe
        .sanitize(Check::new("http", "Mock", server.url("/"), "200"))
        .unwrap();

    let statuses = runner(&registry).run_all(vec![check]).await;
    assert_eq!(statuses.number_outages(), 1);

    let status = statuses.iter().next().unwrap();
    let outcome = status.outcome.as_ref().unwrap();
    assert!(outcome.to_string().contains("503"), "outcome: {outcome}");
}

#[tokio::test]
async fn expected_error_codes_are_a_success() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/maintenance");
            then.status(503);
        })
        .await;

    let registry = Arc::new(Registry::new().unwrap());
    let probe = registry.get("http").unwrap();

    let check = probe
        .sanitize(Check::new("http", "Maintenance", server.url("/maintenance"), "503"))
        .unwrap();

    let statuses = runner(&registry).run_all(vec![check]).await;
    assert_eq!(statuses.number_outages(), 0);
}
