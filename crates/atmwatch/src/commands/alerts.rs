//! Alert command handlers.

use tabled::Tabled;

use atmwatch_core::{Alert, DashboardView, Monitor};

use crate::cli::{AlertsArgs, AlertsCommand, GlobalOpts, OutputFormat};
use crate::commands::{build_context, require_session};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlertRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Device")]
    device_id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Type")]
    alert_type: String,
    #[tabled(rename = "Score")]
    score: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Ack")]
    ack: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&Alert> for AlertRow {
    fn from(a: &Alert) -> Self {
        Self {
            id: a.id.clone(),
            device_id: a.device_id.clone(),
            severity: output::severity_cell(a.severity),
            alert_type: a.alert_type.to_string(),
            score: format!("{:.1}", a.threat_score),
            time: a.timestamp.to_rfc3339(),
            ack: if a.acknowledged { "yes" } else { "no" }.into(),
            message: a.message.clone(),
        }
    }
}

fn summary_lines(view: &DashboardView) -> String {
    format!(
        "Engine state: {}  |  Threat score: {:.1}  |  Unacknowledged: {}\nShowing {} of {} visible alerts",
        output::engine_state_cell(view.threat.engine_state),
        view.threat.score,
        view.unacknowledged,
        view.alerts.len(),
        view.visible_total,
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: AlertsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = build_context(global)?;
    require_session(&ctx)?;

    match args.command {
        AlertsCommand::List(list) => {
            let query = list.to_query();
            let view = Monitor::oneshot(ctx.monitor_config, ctx.session, |m| async move {
                Ok(m.dashboard(&query))
            })
            .await?;

            if global.output == OutputFormat::Table {
                output::print_output(&summary_lines(&view), global.quiet);
            }

            let out = output::render_list(
                global.output,
                &view.alerts,
                |a| AlertRow::from(a),
                |a| a.id.clone(),
            );
            output::print_output(&out, global.quiet);
        }
        AlertsCommand::Ack { alert_id } => {
            let monitor = Monitor::new(ctx.monitor_config, ctx.session)?;
            let ok = monitor.acknowledge(&alert_id).await?;
            if !ok {
                return Err(CliError::ActionRefused {
                    action: "acknowledge".into(),
                });
            }
            output::print_output(&format!("Alert {alert_id} acknowledged"), global.quiet);
        }
        AlertsCommand::Archive { alert_id } => {
            let monitor = Monitor::new(ctx.monitor_config, ctx.session)?;
            let ok = monitor.archive(&alert_id).await?;
            if !ok {
                return Err(CliError::ActionRefused {
                    action: "archive".into(),
                });
            }
            output::print_output(&format!("Alert {alert_id} archived"), global.quiet);
        }
    }
    Ok(())
}
