//! Command dispatch and shared CLI context.

pub mod activity;
pub mod alerts;
pub mod buzzer;
pub mod devices;
pub mod session_cmd;
pub mod status;

use atmwatch_api::SessionContext;
use atmwatch_config as config;
use atmwatch_core::{MonitorConfig, TlsVerification};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Resolved per-invocation context: connection config plus the session
/// preloaded from durable token storage.
pub struct CliContext {
    pub monitor_config: MonitorConfig,
    pub session: SessionContext,
    pub profile_username: Option<String>,
}

/// Build the CLI context from config file, profile, and flag overrides.
pub fn build_context(global: &GlobalOpts) -> Result<CliContext, CliError> {
    let cfg = config::load_config_or_default();

    let (profile, username) = if let Some(ref server) = global.server {
        // Ad-hoc profile from --server; no config file required.
        (
            config::Profile {
                server: server.clone(),
                username: None,
                ca_cert: None,
                insecure: None,
                timeout: None,
                poll_interval: None,
            },
            None,
        )
    } else {
        let (_, profile) = config::resolve_profile(&cfg, global.profile.as_deref())?;
        let username = profile.username.clone();
        (profile.clone(), username)
    };

    let mut monitor_config = config::profile_to_monitor_config(&profile, &cfg.defaults)?;
    if global.insecure {
        monitor_config.tls = TlsVerification::DangerAcceptInvalid;
    }

    let session = config::load_token().map_or_else(SessionContext::new, SessionContext::with_token);

    Ok(CliContext {
        monitor_config,
        session,
        profile_username: username,
    })
}

/// Dispatch a parsed command.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => session_cmd::login(args, global).await,
        Command::Logout => session_cmd::logout(global),
        Command::Devices(args) => devices::handle(args, global).await,
        Command::Alerts(args) => alerts::handle(args, global).await,
        Command::Buzzer(args) => buzzer::handle(args, global).await,
        Command::Activity => activity::handle(global).await,
        Command::Status => status::handle(global).await,
        // Completions are handled in main() before dispatch.
        Command::Completions(_) => Ok(()),
    }
}

/// Commands that read or write backend data require a session.
pub(crate) fn require_session(ctx: &CliContext) -> Result<(), CliError> {
    if ctx.session.is_authenticated() {
        Ok(())
    } else {
        Err(CliError::NotLoggedIn)
    }
}
