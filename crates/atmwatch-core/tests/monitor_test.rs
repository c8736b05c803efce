#![allow(clippy::unwrap_used, clippy::float_cmp)]
// End-to-end tests for the Monitor against a wiremock backend.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atmwatch_api::SessionContext;
use atmwatch_core::{
    AlertQuery, ConnectionState, DeviceState, EngineState, Monitor, MonitorConfig, Role, Severity,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn token_for(role: &str, assigned: &[&str]) -> String {
    use base64::Engine;
    let payload = json!({
        "sub": "u1",
        "username": "tester",
        "role": role,
        "assigned_devices": assigned,
    });
    let body = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("hdr.{body}.sig")
}

async fn mock_backend() -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/atms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"atm_id": "ATM_001", "status": "online", "location": "Banjara Hills, Hyderabad"},
            {"atm_id": "ATM_003", "status": "online", "location": "Kompally, Hyderabad"}
        ])))
        .mount(&server)
        .await;

    // ATM_001 has telemetry at T=100 (Normal) and T=200 (CRITICAL_HAZARD);
    // ATM_003 has none and must enrich to Offline.
    Mock::given(method("GET"))
        .and(path("/api/telemetry"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"device_id": "ATM_001", "timestamp": 100, "state": "Normal", "pir": false},
            {"device_id": "ATM_001", "timestamp": 200, "state": "CRITICAL_HAZARD", "pir": true}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "alrt_001", "device_id": "ATM_001", "timestamp": 400,
             "severity": "CRITICAL", "alert_type": "CAMERA_TAMPER",
             "message": "Camera tampering detected", "state": "CRITICAL_HAZARD",
             "threat_score": 9.5, "signal_types": ["camera_tamper"]},
            {"id": "alrt_002", "device_id": "ATM_003", "timestamp": 300,
             "severity": "HIGH", "alert_type": "VIBRATION",
             "message": "Suspicious vibration pattern", "state": "CONFIRMED_INTRUSION",
             "threat_score": 7.8, "signal_types": ["vibration"], "acknowledged": true},
            {"id": "alrt_003", "device_id": "ATM_001", "timestamp": 200,
             "severity": "MEDIUM", "alert_type": "MOTION",
             "message": "Motion detected after hours", "state": "SUSPICIOUS",
             "threat_score": 4.2, "signal_types": ["motion"]},
            {"id": "alrt_004", "device_id": "ATM_003", "timestamp": 100,
             "severity": "LOW", "alert_type": "UNKNOWN",
             "message": "Unidentified signal", "state": "OBSERVING",
             "threat_score": 0.8, "signal_types": []}
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/user-activity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a1", "userName": "Shreya", "action": "Viewed ATM", "target": "ATM_001",
             "timestamp": 50}
        ])))
        .mount(&server)
        .await;

    server
}

fn monitor_for(server: &MockServer, token: &str) -> Monitor {
    let config = MonitorConfig {
        url: server.uri().parse().unwrap(),
        poll_interval_secs: 0,
        ..MonitorConfig::default()
    };
    let session = SessionContext::with_token(SecretString::from(token.to_string()));
    Monitor::new(config, session).unwrap()
}

// ── Enrichment through the full stack ───────────────────────────────

#[tokio::test]
async fn newest_telemetry_drives_device_state() {
    let server = mock_backend().await;
    let monitor = monitor_for(&server, &token_for("admin", &[]));
    monitor.start().await.unwrap();

    let atms = monitor.enriched_atms();
    assert_eq!(atms.len(), 2);

    // ATM_001: the T=200 CRITICAL_HAZARD reading wins over T=100 Normal.
    assert_eq!(atms[0].device_id, "ATM_001");
    assert_eq!(atms[0].current_state, DeviceState::Critical);

    // ATM_003: no telemetry at all forces Offline despite "online" status.
    assert_eq!(atms[1].device_id, "ATM_003");
    assert_eq!(atms[1].current_state, DeviceState::Offline);

    monitor.shutdown().await;
}

#[tokio::test]
async fn assigned_devices_scope_the_listing() {
    let server = mock_backend().await;
    let monitor = monitor_for(&server, &token_for("operator", &["ATM_003"]));
    monitor.start().await.unwrap();

    let atms = monitor.enriched_atms();
    assert_eq!(atms.len(), 1);
    assert_eq!(atms[0].device_id, "ATM_003");

    monitor.shutdown().await;
}

// ── Dashboard derivation ────────────────────────────────────────────

#[tokio::test]
async fn security_team_dashboard_sees_high_and_critical_only() {
    let server = mock_backend().await;
    let monitor = monitor_for(&server, &token_for("security_team", &[]));
    monitor.start().await.unwrap();

    assert_eq!(monitor.role(), Role::SecurityTeam);

    let view = monitor.dashboard(&AlertQuery::default());
    assert_eq!(view.visible_total, 2);
    assert_eq!(view.alerts.len(), 2);
    assert!(view.alerts.iter().all(|a| a.severity >= Severity::High));

    // Newest-first ordering.
    assert_eq!(view.alerts[0].id, "alrt_001");

    // mean(9.5, 7.8) = 8.65 -> 8.7 -> CRITICAL_HAZARD band.
    assert_eq!(view.threat.score, 8.7);
    assert_eq!(view.threat.engine_state, EngineState::CriticalHazard);
    assert_eq!(view.unacknowledged, 1);

    monitor.shutdown().await;
}

#[tokio::test]
async fn severity_floor_applies_on_top_of_role() {
    let server = mock_backend().await;
    let monitor = monitor_for(&server, &token_for("admin", &[]));
    monitor.start().await.unwrap();

    let query = AlertQuery {
        min_severity: Some(Severity::Medium),
        ..AlertQuery::default()
    };
    let view = monitor.dashboard(&query);

    // MEDIUM floor retains MEDIUM and LOW.
    assert_eq!(view.visible_total, 4);
    assert_eq!(view.alerts.len(), 2);
    assert!(view.alerts.iter().all(|a| a.severity <= Severity::Medium));

    monitor.shutdown().await;
}

#[tokio::test]
async fn unknown_role_falls_back_to_least_privilege() {
    let server = mock_backend().await;
    let monitor = monitor_for(&server, &token_for("warlord", &[]));
    monitor.start().await.unwrap();

    let view = monitor.dashboard(&AlertQuery::default());
    assert!(view.alerts.iter().all(|a| a.severity <= Severity::Medium));
    assert_eq!(view.alerts.len(), 2);

    monitor.shutdown().await;
}

// ── Actions ─────────────────────────────────────────────────────────

#[tokio::test]
async fn acknowledge_updates_the_local_alert() {
    let server = mock_backend().await;

    Mock::given(method("POST"))
        .and(path("/api/alerts/alrt_001/acknowledge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let monitor = monitor_for(&server, &token_for("admin", &[]));
    monitor.start().await.unwrap();

    assert!(monitor.acknowledge("alrt_001").await.unwrap());

    let alert = monitor.store().alert_by_id("alrt_001").unwrap();
    assert!(alert.acknowledged);
    assert_eq!(alert.acknowledged_by.as_deref(), Some("tester"));

    monitor.shutdown().await;
}

// ── Auth failure handling ───────────────────────────────────────────

#[tokio::test]
async fn rejected_session_clears_token_and_logs_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let monitor = monitor_for(&server, &token_for("admin", &[]));
    let result = monitor.start().await;

    assert!(result.is_err());
    assert!(!monitor.session().is_authenticated());
    assert_eq!(*monitor.connection_state().borrow(), ConnectionState::LoggedOut);
}

#[tokio::test]
async fn undecodable_token_is_treated_as_no_session() {
    let server = mock_backend().await;
    let monitor = monitor_for(&server, "garbage-token");

    assert!(monitor.current_user().is_none());
    assert!(!monitor.session().is_authenticated());
    // With no session the derivation falls back to the operator view.
    assert_eq!(monitor.role(), Role::Operator);
}
