// ── Monitor abstraction ──
//
// Full lifecycle management for an ATM Guard backend connection:
// authentication, independent background poll streams, operator
// actions, and derived dashboard views over the DataStore snapshots.
//
// Each stream (devices, telemetry, alerts, audit log) polls on its own
// timer; a failed fetch keeps the previous snapshot on display until
// the next tick succeeds (stale-while-revalidate). A 401 from any
// stream clears the session token and flips the observable connection
// state to `LoggedOut`.

use std::sync::Arc;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use atmwatch_api::transport::{TlsMode, TransportConfig};
use atmwatch_api::{ApiClient, SessionContext, TokenClaims};

use crate::config::{MonitorConfig, TlsVerification};
use crate::convert;
use crate::enrich::{self, StateCounts};
use crate::error::CoreError;
use crate::model::{Alert, Atm, Role, User};
use crate::policy::filter_alerts_by_role;
use crate::store::DataStore;
use crate::threat::{SeverityDistribution, ThreatSummary, unacknowledged_count};
use crate::view::AlertQuery;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No background tasks running.
    Disconnected,
    /// Initial refresh in progress.
    Connecting,
    /// Poll streams active.
    Online,
    /// The backend rejected the session; the stored token was cleared.
    LoggedOut,
}

// ── Dashboard view ───────────────────────────────────────────────

/// The role/filter-applied alert view plus its aggregate statistics.
///
/// Recomputed from the current snapshots on every call -- nothing here
/// is cached across filter changes or poll refreshes.
#[derive(Debug, Clone)]
pub struct DashboardView {
    /// Ordered alerts after the full filter pipeline.
    pub alerts: Vec<Alert>,
    pub threat: ThreatSummary,
    pub distribution: SeverityDistribution,
    pub unacknowledged: usize,
    /// Count after role filtering alone, for "showing N of M".
    pub visible_total: usize,
}

// ── Monitor ──────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Construct with [`Monitor::new`], then
/// [`login`](Self::login) if no persisted token exists, then
/// [`start`](Self::start) to load data and spawn the poll streams.
#[derive(Clone)]
pub struct Monitor {
    inner: Arc<MonitorInner>,
}

struct MonitorInner {
    config: MonitorConfig,
    api: ApiClient,
    session: SessionContext,
    store: Arc<DataStore>,
    state: watch::Sender<ConnectionState>,
    cancel: CancellationToken,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl Monitor {
    /// Create a new Monitor. Does NOT fetch anything -- call
    /// [`start()`](Self::start) to load data and spawn poll tasks.
    ///
    /// The `session` is the process-wide token context; preload it from
    /// durable storage before constructing the monitor.
    pub fn new(config: MonitorConfig, session: SessionContext) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: match &config.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: config.timeout,
        };
        let api = ApiClient::new(config.url.clone(), session.clone(), &transport)?;
        let (state, _) = watch::channel(ConnectionState::Disconnected);

        Ok(Self {
            inner: Arc::new(MonitorInner {
                config,
                api,
                session,
                store: Arc::new(DataStore::new()),
                state,
                cancel: CancellationToken::new(),
                tasks: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Access the monitor configuration.
    pub fn config(&self) -> &MonitorConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// The session context used by this monitor's API client.
    pub fn session(&self) -> &SessionContext {
        &self.inner.session
    }

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Authenticate and store the bearer token in the session context.
    ///
    /// Returns the token for durable persistence. A rejected login
    /// surfaces as `AuthenticationFailed` and leaves any stored token
    /// untouched.
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, CoreError> {
        let resp = self.inner.api.login(username, password).await?;
        // login() only succeeds with a non-empty token.
        let token = resp.access_token.unwrap_or_default();
        info!(username, "login successful");
        Ok(SecretString::from(token))
    }

    /// Drop the session token (client-side logout).
    pub fn logout(&self) {
        self.inner.api.logout();
        let _ = self.inner.state.send(ConnectionState::LoggedOut);
    }

    /// The identity embedded in the current session token.
    ///
    /// A token whose payload fails to decode is treated as no session:
    /// the stored token is cleared and `None` is returned.
    pub fn current_user(&self) -> Option<User> {
        let token = self.inner.session.token()?;
        let Some(claims) = TokenClaims::decode(token.expose_secret()) else {
            warn!("stored token payload is undecodable -- clearing session");
            self.inner.session.clear();
            return None;
        };
        Some(user_from_claims(&claims))
    }

    /// The session role, defaulting to the least-privileged operator
    /// view when no user is established.
    pub fn role(&self) -> Role {
        self.current_user().map_or(Role::Operator, |u| u.role)
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Perform the initial data load and spawn the background poll
    /// streams (unless `poll_interval_secs` is 0).
    pub async fn start(&self) -> Result<(), CoreError> {
        let _ = self.inner.state.send(ConnectionState::Connecting);

        if let Err(e) = self.refresh_all().await {
            let _ = self.inner.state.send(if e.is_auth_rejection() {
                ConnectionState::LoggedOut
            } else {
                ConnectionState::Disconnected
            });
            return Err(e);
        }

        let interval_secs = self.inner.config.poll_interval_secs;
        if interval_secs > 0 {
            let mut handles = self.inner.tasks.lock().await;
            let base = Duration::from_secs(interval_secs);
            let activity = Duration::from_secs(self.inner.config.activity_interval_secs());

            for (name, interval) in [
                (StreamName::Devices, base),
                (StreamName::Telemetry, base),
                (StreamName::Alerts, base),
                (StreamName::Activity, activity),
            ] {
                let monitor = self.clone();
                let cancel = self.inner.cancel.child_token();
                handles.push(tokio::spawn(poll_task(monitor, name, interval, cancel)));
            }
        }

        let _ = self.inner.state.send(ConnectionState::Online);
        info!("monitor online");
        Ok(())
    }

    /// Cancel background tasks and reset to `Disconnected`.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.tasks.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        let _ = self.inner.state.send(ConnectionState::Disconnected);
        debug!("monitor shut down");
    }

    // ── Stream refreshes ─────────────────────────────────────────

    /// Fetch every stream once. Device, telemetry, and alert failures
    /// are fatal; the audit log degrades gracefully.
    pub async fn refresh_all(&self) -> Result<(), CoreError> {
        let (atms, telemetry, alerts, activity) = tokio::join!(
            self.refresh_atms(),
            self.refresh_telemetry(),
            self.refresh_alerts(),
            self.refresh_activity(),
        );
        atms?;
        telemetry?;
        alerts?;
        if let Err(e) = activity {
            warn!(error = %e, "audit-log fetch failed (non-fatal)");
        }

        debug!(
            devices = self.inner.store.atm_count(),
            alerts = self.inner.store.alert_count(),
            "data refresh complete"
        );
        Ok(())
    }

    /// Re-fetch the device listing.
    pub async fn refresh_atms(&self) -> Result<(), CoreError> {
        let seq = self.inner.store.begin_atm_fetch();
        let rows = self.inner.api.list_atms().await?;
        let atms: Vec<Atm> = rows.into_iter().filter_map(convert::atm_from_row).collect();
        self.inner.store.apply_atms(seq, atms);
        Ok(())
    }

    /// Re-fetch the full telemetry stream.
    pub async fn refresh_telemetry(&self) -> Result<(), CoreError> {
        let seq = self.inner.store.begin_telemetry_fetch();
        let rows = self.inner.api.list_telemetry(None).await?;
        let records = rows.into_iter().map(convert::telemetry_from_row).collect();
        self.inner.store.apply_telemetry(seq, records);
        Ok(())
    }

    /// Re-fetch the alert listing.
    pub async fn refresh_alerts(&self) -> Result<(), CoreError> {
        let seq = self.inner.store.begin_alert_fetch();
        let rows = self.inner.api.list_alerts(None).await?;
        let alerts: Vec<Alert> = rows.into_iter().map(convert::alert_from_row).collect();
        self.inner.store.apply_alerts(seq, alerts);
        Ok(())
    }

    /// Re-fetch the audit log.
    pub async fn refresh_activity(&self) -> Result<(), CoreError> {
        let seq = self.inner.store.begin_activity_fetch();
        let rows = self.inner.api.list_user_activity().await?;
        let entries = rows.into_iter().map(convert::audit_from_row).collect();
        self.inner.store.apply_activity(seq, entries);
        Ok(())
    }

    // ── Operator actions ─────────────────────────────────────────

    /// Acknowledge an alert on the backend.
    ///
    /// On a confirmed write the local copy is flipped optimistically;
    /// the next alert poll remains the authoritative corrector. A
    /// failed call leaves the store untouched.
    pub async fn acknowledge(&self, alert_id: &str) -> Result<bool, CoreError> {
        let resp = self.inner.api.acknowledge_alert(alert_id).await?;
        if resp.success {
            let user = self.current_user().map(|u| u.username);
            self.inner.store.mark_acknowledged(alert_id, user.as_deref());
            info!(alert_id, "alert acknowledged");
        }
        Ok(resp.success)
    }

    /// Archive an alert on the backend, mirroring the flag locally on
    /// success.
    pub async fn archive(&self, alert_id: &str) -> Result<bool, CoreError> {
        let resp = self.inner.api.archive_alert(alert_id).await?;
        if resp.success {
            self.inner.store.mark_archived(alert_id);
            info!(alert_id, "alert archived");
        }
        Ok(resp.success)
    }

    /// Trigger or stop the remote buzzer on a device.
    pub async fn set_buzzer(&self, device_id: &str, on: bool) -> Result<bool, CoreError> {
        let resp = self.inner.api.set_buzzer(device_id, on).await?;
        info!(device_id, on, success = resp.success, "buzzer command sent");
        Ok(resp.success)
    }

    /// Fetch one device directly (detail view), bypassing the store.
    pub async fn fetch_atm(&self, device_id: &str) -> Result<Atm, CoreError> {
        let row = self.inner.api.get_atm(device_id).await?;
        convert::atm_from_row(row).ok_or_else(|| CoreError::DeviceNotFound {
            device_id: device_id.to_owned(),
        })
    }

    // ── Derived views ────────────────────────────────────────────

    /// Devices with `current_state` recomputed from the newest
    /// telemetry, scoped to the session user, ordered by device id.
    pub fn enriched_atms(&self) -> Vec<Atm> {
        let atms: Vec<Atm> = self
            .inner
            .store
            .atms_snapshot()
            .iter()
            .map(|a| (**a).clone())
            .collect();
        let telemetry = self.inner.store.telemetry_snapshot();
        let mut enriched = enrich::enrich_atms(&atms, &telemetry);

        if let Some(user) = self.current_user() {
            enriched = enrich::scope_to_user(&enriched, &user);
        }

        enriched.sort_by(|a, b| a.device_id.cmp(&b.device_id));
        enriched
    }

    /// Per-state device counts over the enriched, scoped set.
    pub fn state_counts(&self) -> StateCounts {
        StateCounts::tally(&self.enriched_atms())
    }

    /// The role/filter-applied alert view with aggregate statistics.
    pub fn dashboard(&self, query: &AlertQuery) -> DashboardView {
        let role = self.role();
        let all: Vec<Alert> = self
            .inner
            .store
            .alerts_snapshot()
            .iter()
            .map(|a| (**a).clone())
            .collect();

        let visible_total = filter_alerts_by_role(&all, role).len();
        let alerts = query.apply(&all, role);

        let threat = ThreatSummary::aggregate(&alerts);
        let distribution = SeverityDistribution::tally(&alerts);
        let unacknowledged = unacknowledged_count(&alerts);

        DashboardView {
            threat,
            distribution,
            unacknowledged,
            visible_total,
            alerts,
        }
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: load data, run the closure, shut down. Background
    /// polling is disabled since a single request-response cycle is all
    /// the CLI needs.
    pub async fn oneshot<F, Fut, T>(
        config: MonitorConfig,
        session: SessionContext,
        f: F,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(Monitor) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.poll_interval_secs = 0;

        let monitor = Monitor::new(cfg, session)?;
        monitor.start().await?;
        let result = f(monitor.clone()).await;
        monitor.shutdown().await;
        result
    }
}

// ── Background poll tasks ────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
enum StreamName {
    Devices,
    Telemetry,
    Alerts,
    Activity,
}

impl StreamName {
    fn as_str(self) -> &'static str {
        match self {
            Self::Devices => "devices",
            Self::Telemetry => "telemetry",
            Self::Alerts => "alerts",
            Self::Activity => "activity",
        }
    }
}

/// Poll one stream on a fixed cadence until cancelled.
///
/// Errors are contained here: a transient failure keeps the previous
/// snapshot and waits for the next tick; an authentication rejection
/// flips the connection state (the API client has already cleared the
/// shared token by the time the error surfaces).
async fn poll_task(
    monitor: Monitor,
    stream: StreamName,
    interval: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick completes immediately; start() just refreshed.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let result = match stream {
                    StreamName::Devices => monitor.refresh_atms().await,
                    StreamName::Telemetry => monitor.refresh_telemetry().await,
                    StreamName::Alerts => monitor.refresh_alerts().await,
                    StreamName::Activity => monitor.refresh_activity().await,
                };
                if let Err(e) = result {
                    if e.is_auth_rejection() {
                        warn!(stream = stream.as_str(), "session rejected -- logged out");
                        let _ = monitor.inner.state.send(ConnectionState::LoggedOut);
                    } else {
                        warn!(
                            stream = stream.as_str(),
                            error = %e,
                            "poll failed -- keeping previous snapshot"
                        );
                    }
                }
            }
        }
    }
}

// ── Claims to domain user ────────────────────────────────────────

fn user_from_claims(claims: &TokenClaims) -> User {
    User {
        id: claims.user_id().to_owned(),
        username: claims.username().to_owned(),
        email: claims.email.clone().unwrap_or_default(),
        role: Role::parse(claims.role.as_deref().unwrap_or_default()),
        assigned_devices: claims.assigned_devices().to_vec(),
        name: claims.display_name().to_owned(),
    }
}
