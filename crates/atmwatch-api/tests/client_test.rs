#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use atmwatch_api::{ApiClient, Error, SessionContext};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient, SessionContext) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let session = SessionContext::new();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url, session.clone());
    (server, client, session)
}

fn token_with_payload(payload: serde_json::Value) -> String {
    use base64::Engine;
    let body = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("hdr.{body}.sig")
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn login_stores_token() {
    let (server, client, session) = setup().await;

    let token = token_with_payload(json!({"sub": "u1", "role": "operator"}));
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "token_type": "bearer",
        })))
        .mount(&server)
        .await;

    let secret: SecretString = "pw".to_string().into();
    let resp = client.login("operator1", &secret).await.unwrap();

    assert_eq!(resp.access_token.as_deref(), Some(token.as_str()));
    assert_eq!(session.token().unwrap().expose_secret(), token);
}

#[tokio::test]
async fn login_rejection_keeps_stored_token() {
    let (server, client, session) = setup().await;
    session.set(SecretString::from("previous-token".to_string()));

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad credentials"))
        .mount(&server)
        .await;

    let secret: SecretString = "wrong".to_string().into();
    let result = client.login("operator1", &secret).await;

    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
    // Login rejection must not mutate the stored credential.
    assert_eq!(session.token().unwrap().expose_secret(), "previous-token");
}

#[tokio::test]
async fn login_without_access_token_is_rejected() {
    let (server, client, session) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "bearer"})))
        .mount(&server)
        .await;

    let secret: SecretString = "pw".to_string().into();
    let result = client.login("operator1", &secret).await;

    assert!(matches!(result, Err(Error::Authentication { .. })));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn bearer_header_attached_when_token_present() {
    let (server, client, session) = setup().await;
    session.set(SecretString::from("tok123".to_string()));

    Mock::given(method("GET"))
        .and(path("/api/atms"))
        .and(header("Authorization", "Bearer tok123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let atms = client.list_atms().await.unwrap();
    assert!(atms.is_empty());
}

#[tokio::test]
async fn unauthorized_response_clears_session() {
    let (server, client, session) = setup().await;
    session.set(SecretString::from("expired".to_string()));

    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_alerts(None).await;

    assert!(matches!(result, Err(Error::Authentication { .. })));
    assert!(!session.is_authenticated(), "401 must clear the session token");
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn list_atms_decodes_rows() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/atms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "atm_id": "ATM_001",
                "status": "online",
                "location": "Banjara Hills, Hyderabad",
                "last_heartbeat": "2026-03-01T10:00:00Z"
            },
            {
                "id": 2,
                "device_id": "ATM_003",
                "status": "offline"
            }
        ])))
        .mount(&server)
        .await;

    let atms = client.list_atms().await.unwrap();

    assert_eq!(atms.len(), 2);
    assert_eq!(atms[0].atm_id.as_deref(), Some("ATM_001"));
    assert_eq!(atms[0].status.as_deref(), Some("online"));
    assert_eq!(atms[1].device_id.as_deref(), Some("ATM_003"));
    assert!(atms[1].location.is_none());
}

#[tokio::test]
async fn get_atm_handles_array_response() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/atms/ATM_003"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"atm_id": "ATM_001", "status": "online"},
            {"atm_id": "ATM_003", "status": "offline"}
        ])))
        .mount(&server)
        .await;

    let atm = client.get_atm("ATM_003").await.unwrap();
    assert_eq!(atm.atm_id.as_deref(), Some("ATM_003"));
}

#[tokio::test]
async fn get_atm_falls_back_to_listing() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/atms/ATM_001"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/atms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"atm_id": "ATM_001", "status": "online"}
        ])))
        .mount(&server)
        .await;

    let atm = client.get_atm("ATM_001").await.unwrap();
    assert_eq!(atm.atm_id.as_deref(), Some("ATM_001"));
}

#[tokio::test]
async fn get_atm_unknown_device_is_not_found() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/atms/ATM_999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/atms"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let result = client.get_atm("ATM_999").await;
    assert!(matches!(result, Err(Error::DeviceNotFound { .. })));
}

// ── Telemetry & alerts ──────────────────────────────────────────────

#[tokio::test]
async fn telemetry_device_filter_is_passed_through() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/telemetry"))
        .and(query_param("device_id", "ATM_001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "device_id": "ATM_001",
                "timestamp": 1764000000,
                "pir": 1,
                "vibration": false,
                "state": "Normal",
                "person_count": 0
            }
        ])))
        .mount(&server)
        .await;

    let records = client.list_telemetry(Some("ATM_001")).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].device_id, "ATM_001");
    assert_eq!(records[0].state, "Normal");
}

#[tokio::test]
async fn alerts_decode_with_missing_optionals() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "alrt_001",
                "device_id": "ATM_001",
                "timestamp": "2026-03-01T10:00:00Z",
                "severity": "CRITICAL",
                "alert_type": "CAMERA_TAMPER",
                "message": "Camera tampering detected",
                "state": "CRITICAL_HAZARD",
                "threat_score": 9.5,
                "signal_types": ["camera_tamper"]
            }
        ])))
        .mount(&server)
        .await;

    let alerts = client.list_alerts(None).await.unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, "CRITICAL");
    assert_eq!(alerts[0].acknowledged, None);
}

#[tokio::test]
async fn acknowledge_and_archive_post_to_alert_endpoints() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/alerts/alrt_001/acknowledge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/alerts/alrt_001/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    assert!(client.acknowledge_alert("alrt_001").await.unwrap().success);
    assert!(client.archive_alert("alrt_001").await.unwrap().success);
}

// ── Buzzer ──────────────────────────────────────────────────────────

#[tokio::test]
async fn buzzer_on_and_off_use_split_endpoints() {
    let (server, client, _) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/control/buzzer/ATM_001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/control/buzzer/stop/ATM_001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    assert!(client.set_buzzer("ATM_001", true).await.unwrap().success);
    assert!(client.set_buzzer("ATM_001", false).await.unwrap().success);
}

// ── Audit log ───────────────────────────────────────────────────────

#[tokio::test]
async fn activity_rows_tolerate_loose_field_names() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/user-activity"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a1", "userName": "Shreya", "action": "Viewed ATM", "target": "ATM_001",
             "timestamp": "2026-03-01T10:00:00Z"},
            {"id": 2, "user_id": "u2", "action": "Login", "device_id": "ATM_003",
             "timestamp": 1764000000}
        ])))
        .mount(&server)
        .await;

    let entries = client.list_user_activity().await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].user_name.as_deref(), Some("Shreya"));
    assert_eq!(entries[1].user_id.as_deref(), Some("u2"));
    assert_eq!(entries[1].device_id.as_deref(), Some("ATM_003"));
}

// ── Error surface ───────────────────────────────────────────────────

#[tokio::test]
async fn non_success_status_carries_body_text() {
    let (server, client, _) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/atms"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance window"))
        .mount(&server)
        .await;

    match client.list_atms().await {
        Err(Error::Api { status, body }) => {
            assert_eq!(status, 503);
            assert!(body.contains("maintenance window"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
