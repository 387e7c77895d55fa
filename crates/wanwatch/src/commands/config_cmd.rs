//! `wanwatch config`: config file location and resolved profile.

use serde::Serialize;

use wanwatch_config::Profile;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct ShownProfile {
    name: String,
    #[serde(flatten)]
    profile: Profile,
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            let path = wanwatch_config::config_path();
            output::print_output(&path.display().to_string(), global.quiet);
            Ok(())
        }
        ConfigCommand::Show => {
            let resolved = config::resolve_profile(global)?;
            let shown = ShownProfile {
                name: resolved.name,
                profile: resolved.profile.redacted(),
            };
            let body = toml::to_string_pretty(&shown.profile).map_err(|e| CliError::Output {
                message: e.to_string(),
            })?;

            let out = output::render_single(
                global.output,
                &shown,
                |p| format!("[profiles.{}]\n{body}", p.name),
                |p| p.name.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
