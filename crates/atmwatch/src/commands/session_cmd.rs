//! Login and logout handlers.

use secrecy::SecretString;

use atmwatch_config as config;
use atmwatch_core::Monitor;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::commands::build_context;
use crate::error::CliError;
use crate::output;

pub async fn login(args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = build_context(global)?;

    let username = args
        .username
        .or(ctx.profile_username)
        .ok_or_else(|| CliError::Validation {
            field: "username".into(),
            reason: "pass --username or set one in the profile".into(),
        })?;

    let password = match std::env::var("ATMWATCH_PASSWORD") {
        Ok(pw) => SecretString::from(pw),
        Err(_) => SecretString::from(rpassword::prompt_password("Password: ")?),
    };

    let monitor = Monitor::new(ctx.monitor_config, ctx.session)?;
    let token = monitor.login(&username, &password).await?;
    config::save_token(&token)?;

    let role = monitor
        .current_user()
        .map_or_else(|| "user".into(), |u| u.role.display_name().to_owned());
    output::print_output(&format!("Logged in as {username} ({role})"), global.quiet);
    Ok(())
}

pub fn logout(global: &GlobalOpts) -> Result<(), CliError> {
    config::clear_token()?;
    output::print_output("Logged out", global.quiet);
    Ok(())
}
