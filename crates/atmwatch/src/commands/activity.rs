//! Audit-log listing.

use tabled::Tabled;

use atmwatch_core::{AuditEntry, Monitor};

use crate::cli::GlobalOpts;
use crate::commands::{build_context, require_session};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ActivityRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Target")]
    target: String,
}

impl From<&AuditEntry> for ActivityRow {
    fn from(e: &AuditEntry) -> Self {
        Self {
            time: e.timestamp.to_rfc3339(),
            user: e.user.clone(),
            action: e.action.clone(),
            target: e.target.clone().unwrap_or_else(|| "-".into()),
        }
    }
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = build_context(global)?;
    require_session(&ctx)?;

    let entries = Monitor::oneshot(ctx.monitor_config, ctx.session, |m| async move {
        let mut entries: Vec<AuditEntry> = m.store().activity_snapshot().to_vec();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    })
    .await?;

    let out = output::render_list(global.output, &entries, |e| ActivityRow::from(e), |e| e.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}
