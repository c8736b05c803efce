//! Aggregate threat summary for the session role.

use serde::Serialize;

use atmwatch_core::enrich::StateCounts;
use atmwatch_core::{AlertQuery, EngineState, Monitor, Role, SeverityDistribution};

use crate::cli::GlobalOpts;
use crate::commands::{build_context, require_session};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct StatusReport {
    role: Role,
    engine_state: EngineState,
    threat_score: f64,
    visible_alerts: usize,
    unacknowledged: usize,
    distribution: SeverityDistribution,
    devices: StateCounts,
}

fn detail(report: &StatusReport) -> String {
    [
        format!("Role:           {}", report.role.display_name()),
        format!(
            "Engine state:   {}",
            output::engine_state_cell(report.engine_state)
        ),
        format!("Threat score:   {:.1}", report.threat_score),
        format!("Visible alerts: {}", report.visible_alerts),
        format!("Unacknowledged: {}", report.unacknowledged),
        format!(
            "By severity:    {} critical / {} high / {} medium / {} low",
            report.distribution.critical,
            report.distribution.high,
            report.distribution.medium,
            report.distribution.low
        ),
        format!(
            "Devices:        {} online ({} critical, {} suspicious), {} offline",
            report.devices.online(),
            report.devices.critical,
            report.devices.suspicious,
            report.devices.offline
        ),
    ]
    .join("\n")
}

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = build_context(global)?;
    require_session(&ctx)?;

    let report = Monitor::oneshot(ctx.monitor_config, ctx.session, |m| async move {
        let view = m.dashboard(&AlertQuery::default());
        Ok(StatusReport {
            role: m.role(),
            engine_state: view.threat.engine_state,
            threat_score: view.threat.score,
            visible_alerts: view.alerts.len(),
            unacknowledged: view.unacknowledged,
            distribution: view.distribution,
            devices: m.state_counts(),
        })
    })
    .await?;

    let out = output::render_single(global.output, &report, detail, |r| {
        r.engine_state.to_string()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}
