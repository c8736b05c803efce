// ATM Guard HTTP client
//
// Wraps `reqwest::Client` with backend URL construction, bearer-token
// injection, and uniform status handling. A 401 from any request clears
// the shared session token before the error surfaces -- every poll
// stream funnels through here, so an expired session logs the whole
// process out regardless of which stream noticed first.

use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::models::{AckResponse, ActivityRow, AlertRow, AtmRow, LoginResponse, TelemetryRow};
use crate::session::SessionContext;
use crate::transport::TransportConfig;

/// Async client for the ATM Guard REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionContext,
}

impl ApiClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root (e.g. `https://guard.example.com`);
    /// the `/api` prefix is appended per request.
    pub fn new(
        base_url: Url,
        session: SessionContext,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, session: SessionContext) -> Self {
        Self {
            http,
            base_url,
            session,
        }
    }

    /// The session context this client reads tokens from.
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Build a full URL for an API path: `{base}/api/{path}`.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/api/{path}")).map_err(Error::InvalidUrl)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Attach `Authorization: Bearer <token>` when a token is present.
    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a GET request and decode the JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self
            .apply_auth(self.http.get(url))
            .send()
            .await
            .map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    /// Send a bodyless POST request and decode the JSON response.
    pub(crate) async fn post<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self
            .apply_auth(self.http.post(url))
            .send()
            .await
            .map_err(Error::Transport)?;
        self.parse_response(resp).await
    }

    /// Uniform status handling and JSON decoding.
    ///
    /// A 401 clears the session token as a side effect before the error
    /// is returned. Other non-2xx statuses surface the body text.
    async fn parse_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            warn!("authentication rejected -- clearing session token");
            self.session.clear();
            return Err(Error::Authentication {
                message: "session expired or invalid credentials".into(),
            });
        }

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body,
        })
    }

    // ── Auth ─────────────────────────────────────────────────────────

    /// Authenticate with username/password.
    ///
    /// On success the access token is stored in the session context and
    /// returned for persistence. A rejected login never touches a
    /// previously stored token -- only a 401 on an authenticated request
    /// does that.
    pub async fn login(&self, username: &str, password: &secrecy::SecretString) -> Result<LoginResponse, Error> {
        let url = self.api_url("login")?;
        debug!("logging in at {}", url);

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status}): {}", preview(&body)),
            });
        }

        let login: LoginResponse = {
            let body = resp.text().await.map_err(Error::Transport)?;
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body,
            })?
        };

        let Some(token) = login.access_token.as_deref().filter(|t| !t.is_empty()) else {
            return Err(Error::Authentication {
                message: "login response missing access token".into(),
            });
        };

        self.session.set(secrecy::SecretString::from(token.to_owned()));
        debug!("login successful");
        Ok(login)
    }

    /// End the session. Client-side only -- the backend has no logout
    /// endpoint; dropping the token is sufficient.
    pub fn logout(&self) {
        self.session.clear();
    }

    // ── Devices ──────────────────────────────────────────────────────

    /// Fetch all device rows.
    pub async fn list_atms(&self) -> Result<Vec<AtmRow>, Error> {
        let url = self.api_url("atms")?;
        self.get(url).await
    }

    /// Fetch a single device row.
    ///
    /// Some backend versions return an array from the single-resource
    /// endpoint, and some lack it entirely; both cases fall back to
    /// filtering the full listing client-side.
    pub async fn get_atm(&self, device_id: &str) -> Result<AtmRow, Error> {
        let url = self.api_url(&format!("atms/{device_id}"))?;

        match self.get::<serde_json::Value>(url).await {
            Ok(value) => {
                if let Some(rows) = value.as_array() {
                    let row = rows
                        .iter()
                        .find(|r| row_matches_device(r, device_id))
                        .or_else(|| rows.first());
                    if let Some(row) = row {
                        return decode_atm_row(row.clone());
                    }
                    // Empty array: fall through to the list fallback.
                } else {
                    return decode_atm_row(value);
                }
            }
            Err(e) => {
                warn!(device_id, error = %e, "single-device fetch failed, falling back to listing");
            }
        }

        let all = self.list_atms().await?;
        all.into_iter()
            .find(|r| {
                r.atm_id.as_deref() == Some(device_id) || r.device_id.as_deref() == Some(device_id)
            })
            .ok_or_else(|| Error::DeviceNotFound {
                device_id: device_id.to_owned(),
            })
    }

    // ── Telemetry ────────────────────────────────────────────────────

    /// Fetch telemetry records, optionally scoped to one device.
    pub async fn list_telemetry(&self, device_id: Option<&str>) -> Result<Vec<TelemetryRow>, Error> {
        let mut url = self.api_url("telemetry")?;
        if let Some(id) = device_id {
            url.query_pairs_mut().append_pair("device_id", id);
        }
        self.get(url).await
    }

    // ── Alerts ───────────────────────────────────────────────────────

    /// Fetch alerts, optionally scoped to one device.
    pub async fn list_alerts(&self, device_id: Option<&str>) -> Result<Vec<AlertRow>, Error> {
        let mut url = self.api_url("alerts")?;
        if let Some(id) = device_id {
            url.query_pairs_mut().append_pair("device_id", id);
        }
        self.get(url).await
    }

    /// Mark an alert as acknowledged.
    pub async fn acknowledge_alert(&self, alert_id: &str) -> Result<AckResponse, Error> {
        let url = self.api_url(&format!("alerts/{alert_id}/acknowledge"))?;
        self.post(url).await
    }

    /// Archive an alert.
    pub async fn archive_alert(&self, alert_id: &str) -> Result<AckResponse, Error> {
        let url = self.api_url(&format!("alerts/{alert_id}/archive"))?;
        self.post(url).await
    }

    // ── Buzzer ───────────────────────────────────────────────────────

    /// Turn the remote buzzer on or off. The backend splits the boolean
    /// into two endpoints.
    pub async fn set_buzzer(&self, device_id: &str, on: bool) -> Result<AckResponse, Error> {
        let path = if on {
            format!("control/buzzer/{device_id}")
        } else {
            format!("control/buzzer/stop/{device_id}")
        };
        let url = self.api_url(&path)?;
        self.post(url).await
    }

    // ── Audit log ────────────────────────────────────────────────────

    /// Fetch the user-activity audit log.
    pub async fn list_user_activity(&self) -> Result<Vec<ActivityRow>, Error> {
        let url = self.api_url("user-activity")?;
        self.get(url).await
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn row_matches_device(row: &serde_json::Value, device_id: &str) -> bool {
    let key = row
        .get("atm_id")
        .or_else(|| row.get("device_id"))
        .and_then(|v| v.as_str());
    key == Some(device_id)
}

fn decode_atm_row(value: serde_json::Value) -> Result<AtmRow, Error> {
    let body = value.to_string();
    serde_json::from_value(value).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

/// Truncate a body to a short, char-boundary-safe preview for messages.
fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
