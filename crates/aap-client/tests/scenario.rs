use std::time::Duration;

use aap_api::service::AssessmentService;
use aap_api::state::AppState;
use aap_client::client::AapClient;
use aap_client::error::ClientError;
use aap_client::scenario::{self, CheckReport, ScenarioConfig};
use aap_storage::store::EventStore;
use serde_json::json;

/// Serve a fresh in-memory service on an ephemeral port; returns its base URL.
fn spawn_service() -> String {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let listener = runtime
        .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
        .unwrap();
    let addr = listener.local_addr().unwrap();
    let app = aap_api::router(AppState::new(
        AssessmentService::new(EventStore::memory()),
        None,
    ));
    std::thread::spawn(move || {
        runtime.block_on(async move { axum::serve(listener, app).await.unwrap() })
    });
    format!("http://{addr}")
}

fn assert_passed(report: &CheckReport) {
    assert!(report.passed(), "failed checks: {:?}", report.failures());
}

#[test]
fn health_reports_up() {
    let client = AapClient::new(spawn_service());
    assert!(client.health().unwrap());
}

#[test]
fn create_and_query_scenario_passes() {
    let client = AapClient::new(spawn_service());
    let report = scenario::create_and_query(&client).unwrap();
    assert_passed(&report);
    assert!(report.checks.len() >= 10);
}

#[test]
fn point_in_time_scenario_passes() {
    let client = AapClient::new(spawn_service());
    let report = scenario::point_in_time(&client, &ScenarioConfig::fast(48)).unwrap();
    assert_passed(&report);
}

#[test]
fn non_object_commands_fail_individually() {
    let client = AapClient::new(spawn_service());
    let response = client.commands(vec![json!("not an object")]).unwrap();
    assert!(!response.commands[0].result.success);
    assert_eq!(response.commands[0].result.result_type, "UnknownCommandResult");
}

#[test]
fn unreachable_service_is_an_http_error() {
    // Nothing listens on port 9 (discard) in the test environment.
    let client = AapClient::new("http://127.0.0.1:9");
    let err = client.health().unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}

#[test]
fn scenario_config_reads_overrides() {
    let config = ScenarioConfig::from_lookup(|name| match name {
        "LOOP_COUNT" => Some("10".to_string()),
        "MIN_THINK_TIME" => Some("0.5".to_string()),
        "MAX_THINK_TIME" => Some("0.1".to_string()),
        "PIT_GAP_SECONDS" => Some("nonsense".to_string()),
        _ => None,
    });
    assert_eq!(config.loop_count, 10);
    assert_eq!(config.min_think, Duration::from_millis(500));
    // Max never drops below min.
    assert_eq!(config.max_think, Duration::from_millis(500));
    assert_eq!(config.pit_gap, ScenarioConfig::default().pit_gap);
}

#[test]
fn zero_loop_count_falls_back_to_the_default() {
    let config = ScenarioConfig::from_lookup(|name| match name {
        "LOOP_COUNT" => Some("0".to_string()),
        _ => None,
    });
    assert_eq!(config.loop_count, ScenarioConfig::default().loop_count);
}

#[test]
fn out_of_range_loop_counts_are_rejected_before_any_request() {
    // Nothing listens here; a request would surface as ClientError::Http.
    let client = AapClient::new("http://127.0.0.1:9");
    for loop_count in [0, u32::MAX, u32::MAX - 2] {
        let err = scenario::point_in_time(&client, &ScenarioConfig::fast(loop_count)).unwrap_err();
        assert!(matches!(err, ClientError::Config(_)), "{err:?}");
    }
}

#[test]
fn check_report_collects_failures() {
    let mut report = CheckReport::default();
    assert!(report.check("first", true));
    assert!(!report.check("second", false));
    assert!(!report.passed());
    assert_eq!(report.failures(), vec!["second"]);
}
