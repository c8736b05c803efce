//! Device command handlers.

use tabled::Tabled;

use atmwatch_core::{Atm, Monitor};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::commands::{build_context, require_session};
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Device")]
    device_id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Branch")]
    branch: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Last Heartbeat")]
    heartbeat: String,
    #[tabled(rename = "Buzzer")]
    buzzer: String,
}

impl From<&Atm> for DeviceRow {
    fn from(a: &Atm) -> Self {
        Self {
            device_id: a.device_id.clone(),
            state: output::state_cell(a.current_state),
            branch: a.location.as_ref().map(|l| l.branch.clone()).unwrap_or_default(),
            city: a.location.as_ref().map(|l| l.city.clone()).unwrap_or_default(),
            heartbeat: a
                .last_heartbeat
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "-".into()),
            buzzer: if a.buzzer_enabled { "on" } else { "off" }.into(),
        }
    }
}

fn detail(a: &Atm) -> String {
    let mut lines = vec![
        format!("Device:    {}", a.device_id),
        format!("State:     {}", output::state_cell(a.current_state)),
    ];
    if let Some(ref loc) = a.location {
        lines.push(format!("Branch:    {}", loc.branch));
        lines.push(format!("City:      {}", loc.city));
        if let (Some(lat), Some(lng)) = (loc.lat, loc.lng) {
            lines.push(format!("Coords:    {lat:.4}, {lng:.4}"));
        }
    }
    if let Some(ref contact) = a.responder {
        lines.push(format!(
            "Responder: {} ({}{})",
            contact.name,
            contact.phone,
            contact
                .distance
                .as_deref()
                .map(|d| format!(", {d}"))
                .unwrap_or_default()
        ));
    }
    if let Some(hb) = a.last_heartbeat {
        lines.push(format!("Heartbeat: {}", hb.to_rfc3339()));
    }
    lines.push(format!(
        "Buzzer:    {}",
        if a.buzzer_enabled { "on" } else { "off" }
    ));
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = build_context(global)?;
    require_session(&ctx)?;

    match args.command {
        DevicesCommand::List => {
            let atms = Monitor::oneshot(ctx.monitor_config, ctx.session, |m| async move {
                Ok(m.enriched_atms())
            })
            .await?;

            let out = output::render_list(
                global.output,
                &atms,
                |a| DeviceRow::from(a),
                |a| a.device_id.clone(),
            );
            output::print_output(&out, global.quiet);
        }
        DevicesCommand::Show { device_id } => {
            let atm = Monitor::oneshot(ctx.monitor_config, ctx.session, |m| async move {
                // The enriched view carries the telemetry-derived state;
                // fall back to the direct fetch for unknown devices.
                match m.enriched_atms().into_iter().find(|a| a.device_id == device_id) {
                    Some(atm) => Ok(atm),
                    None => m.fetch_atm(&device_id).await,
                }
            })
            .await?;

            let out = output::render_single(global.output, &atm, detail, |a| a.device_id.clone());
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
