use std::collections::BTreeMap;

use httpmock::prelude::*;
use serde_json::json;

use sentinel_sim::api::ApiClient;
use sentinel_sim::config::{AppConfig, SimulatorConfig};
use sentinel_sim::core::types::{
    ActionRequest, ActionType, LogFilter, ThreatFilter, ThreatStatus, ThreatType,
};
use sentinel_sim::sim::runner::{shared, SharedSimulator};
use sentinel_sim::sim::TelemetrySimulator;

fn test_config(base_url: &str) -> AppConfig {
    AppConfig {
        api_base_url: base_url.to_string(),
        timeout_ms: 2_000,
        user_agent: "sentinel-test".to_string(),
        offline: false,
        simulator: SimulatorConfig {
            seed: Some(77),
            ..SimulatorConfig::default()
        },
    }
}

fn test_sim(cfg: &AppConfig) -> SharedSimulator {
    shared(TelemetrySimulator::new(cfg.simulator.clone()))
}

#[tokio::test]
async fn logs_come_from_backend_when_it_answers() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/logs");
        then.status(200).json_body(json!({
            "logs": [{
                "id": "log-1",
                "timestamp": "2025-06-01T12:00:00Z",
                "source": "Windows-Security",
                "level": "info",
                "message": "Event ID 4624: Successful account login",
            }]
        }));
    });

    let cfg = test_config(&server.base_url());
    let api = ApiClient::new(&cfg, test_sim(&cfg)).unwrap();
    let logs = api.fetch_logs(&LogFilter::default()).await;

    mock.assert();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].id, "log-1");
}

#[tokio::test]
async fn logs_fall_back_to_simulator_on_server_error() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/logs");
        then.status(500);
    });

    let cfg = test_config(&server.base_url());
    let api = ApiClient::new(&cfg, test_sim(&cfg)).unwrap();
    let logs = api.fetch_logs(&LogFilter::default()).await;

    mock.assert();
    assert!(!logs.is_empty(), "fallback should still produce data");
}

#[tokio::test]
async fn logs_fall_back_when_backend_is_unreachable() {
    // nothing listens here
    let cfg = test_config("http://127.0.0.1:9");
    let api = ApiClient::new(&cfg, test_sim(&cfg)).unwrap();
    let logs = api.fetch_logs(&LogFilter::default()).await;
    assert!(!logs.is_empty());
}

#[tokio::test]
async fn offline_mode_never_touches_the_network() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/logs");
        then.status(200).json_body(json!({"logs": []}));
    });

    let mut cfg = test_config(&server.base_url());
    cfg.offline = true;
    let api = ApiClient::new(&cfg, test_sim(&cfg)).unwrap();
    let logs = api.fetch_logs(&LogFilter::default()).await;

    mock.assert_hits(0);
    assert!(!logs.is_empty());
}

#[tokio::test]
async fn threat_filter_is_applied_to_fallback_data() {
    let cfg = test_config("http://127.0.0.1:9");
    let sim = test_sim(&cfg);
    {
        let mut guard = sim.lock().unwrap();
        guard.spawn_threat(Some(ThreatType::Malware));
        guard.spawn_threat(Some(ThreatType::BruteForce));
    }
    let api = ApiClient::new(&cfg, sim).unwrap();

    let filter = ThreatFilter {
        threat_type: Some(ThreatType::Malware),
        ..ThreatFilter::default()
    };
    let threats = api.fetch_threats(&filter).await;
    assert!(!threats.is_empty());
    assert!(threats.iter().all(|t| t.threat_type == ThreatType::Malware));
}

#[tokio::test]
async fn action_passes_through_when_backend_answers() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/api/threats/t-1/action");
        then.status(200).json_body(json!({
            "action_id": "a-1",
            "threat_id": "t-1",
            "status": "completed",
            "message": "done",
            "timestamp": "2025-06-01T12:00:00Z",
        }));
    });

    let cfg = test_config(&server.base_url());
    let api = ApiClient::new(&cfg, test_sim(&cfg)).unwrap();
    let request = ActionRequest {
        action_type: ActionType::Resolve,
        threat_id: "t-1".to_string(),
        parameters: BTreeMap::new(),
    };
    let result = api.trigger_action(&request).await.unwrap();

    mock.assert();
    assert_eq!(result.action_id, "a-1");
    assert_eq!(result.status, "completed");
}

#[tokio::test]
async fn action_falls_back_and_resolves_locally() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST);
        then.status(500);
    });

    let cfg = test_config(&server.base_url());
    let sim = test_sim(&cfg);
    let threat = {
        let mut guard = sim.lock().unwrap();
        guard.spawn_threat(Some(ThreatType::DataExfiltration)).unwrap()
    };
    let api = ApiClient::new(&cfg, sim.clone()).unwrap();

    let request = ActionRequest {
        action_type: ActionType::Resolve,
        threat_id: threat.id.clone(),
        parameters: BTreeMap::new(),
    };
    let result = api.trigger_action(&request).await.unwrap();
    assert_eq!(result.threat_id, threat.id);
    assert_eq!(result.status, "completed");

    let guard = sim.lock().unwrap();
    let updated = guard
        .threats()
        .into_iter()
        .find(|t| t.id == threat.id)
        .unwrap();
    assert_eq!(updated.status, ThreatStatus::Resolved);
}

#[tokio::test]
async fn unknown_threat_action_fails_even_in_fallback() {
    let cfg = test_config("http://127.0.0.1:9");
    let api = ApiClient::new(&cfg, test_sim(&cfg)).unwrap();
    let request = ActionRequest {
        action_type: ActionType::Contain,
        threat_id: "missing".to_string(),
        parameters: BTreeMap::new(),
    };
    assert!(api.trigger_action(&request).await.is_err());
}

#[tokio::test]
async fn stats_fall_back_to_simulator() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/stats");
        then.status(503);
    });

    let cfg = test_config(&server.base_url());
    let sim = test_sim(&cfg);
    {
        let mut guard = sim.lock().unwrap();
        guard.seed_initial();
    }
    let api = ApiClient::new(&cfg, sim).unwrap();
    let stats = api.fetch_stats().await;

    mock.assert();
    assert!(stats.total_logs > 0);
    assert!(stats.active_threats + stats.resolved_threats > 0);
}
