//! Config subcommand handlers.

use dialoguer::Input;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;

use super::util;

fn render_config(cfg: &Config, format: &OutputFormat) -> Result<String, CliError> {
    match format {
        OutputFormat::Table | OutputFormat::Plain => {
            toml::to_string_pretty(cfg).map_err(|e| CliError::Render(e.to_string()))
        }
        structured => output::render_single(structured, cfg, |_| String::new(), |_| String::new()),
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = config::load_config()?;
            if let Some(ref url) = global.api_url {
                cfg.api_url = Some(url.clone());
            }
            if let Some(timeout) = global.timeout {
                cfg.timeout_secs = timeout;
            }
            if global.insecure {
                cfg.insecure = true;
            }
            output::print_output(&render_config(&cfg, &global.format())?, global.quiet);
            Ok(())
        }

        ConfigCommand::Init => {
            let path = config::config_path();
            if !util::interactive() {
                return Err(CliError::Prompt(
                    "config init is interactive; edit the file directly instead".into(),
                ));
            }
            if path.exists()
                && !util::confirm(&format!("Overwrite {}?", path.display()), global.yes)?
            {
                util::status_line(global, "Aborted");
                return Ok(());
            }

            eprintln!("Disha CLI configuration wizard");
            eprintln!("   Config path: {}\n", path.display());

            let mut cfg = config::load_config().unwrap_or_default();

            let api_url: String = Input::new()
                .with_prompt("Backend URL")
                .default(
                    global
                        .api_url
                        .clone()
                        .or_else(|| cfg.api_url.clone())
                        .unwrap_or_else(|| "http://localhost:8000".into()),
                )
                .interact_text()
                .map_err(util::prompt_err)?;
            cfg.api_url = Some(api_url.trim().to_owned());

            cfg.poll_interval_secs = Input::new()
                .with_prompt("Poll interval (seconds)")
                .default(cfg.poll_interval_secs)
                .interact_text()
                .map_err(util::prompt_err)?;

            cfg.emergency.road_id = Input::new()
                .with_prompt("Emergency simulation road")
                .default(cfg.emergency.road_id.clone())
                .interact_text()
                .map_err(util::prompt_err)?;

            // Reject before writing anything.
            cfg.to_view_config()?;

            let written = config::save_config(&cfg)?;
            util::status_line(global, &format!("Saved {}", written.display()));
            Ok(())
        }
    }
}
