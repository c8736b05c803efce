//! Remote buzzer control.

use atmwatch_core::Monitor;

use crate::cli::{BuzzerArgs, BuzzerCommand, GlobalOpts};
use crate::commands::{build_context, require_session};
use crate::error::CliError;
use crate::output;

pub async fn handle(args: BuzzerArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = build_context(global)?;
    require_session(&ctx)?;

    let (device_id, on) = match args.command {
        BuzzerCommand::On { device_id } => (device_id, true),
        BuzzerCommand::Off { device_id } => (device_id, false),
    };

    let monitor = Monitor::new(ctx.monitor_config, ctx.session)?;
    let ok = monitor.set_buzzer(&device_id, on).await?;
    if !ok {
        return Err(CliError::ActionRefused {
            action: "buzzer".into(),
        });
    }

    let verb = if on { "sounding" } else { "silenced" };
    output::print_output(&format!("Buzzer {verb} on {device_id}"), global.quiet);
    Ok(())
}
