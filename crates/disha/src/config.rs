//! CLI configuration: thin wrapper around `disha_config`.
//!
//! Adds flag overrides (--api-url, --timeout, --insecure, --output,
//! --color) on top of the file and environment layers.

use std::str::FromStr;

use clap::ValueEnum;

use disha_core::{TlsVerification, ViewConfig};

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

pub use disha_config::{Config, config_path, load_config, save_config};

/// Fold file-level display defaults into unset flags.
pub fn apply_display_defaults(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        global.output = Some(parse_value::<OutputFormat>("output", &cfg.output)?);
    }
    if global.color.is_none() {
        global.color = Some(parse_value::<ColorMode>("color", &cfg.color)?);
    }
    Ok(())
}

fn parse_value<T: ValueEnum>(field: &str, raw: &str) -> Result<T, CliError> {
    T::from_str(raw, true).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("unsupported value '{raw}'"),
    })
}

/// Apply flag overrides to the file config, then translate.
pub fn resolve_view_config(global: &GlobalOpts, cfg: &Config) -> Result<ViewConfig, CliError> {
    let mut merged = cfg.clone();
    if let Some(ref url) = global.api_url {
        merged.api_url = Some(url.clone());
    }
    if let Some(timeout) = global.timeout {
        merged.timeout_secs = timeout;
    }
    let mut view = merged.to_view_config()?;
    if global.insecure {
        view.tls = TlsVerification::DangerAcceptInvalid;
    }
    Ok(view)
}

/// Parse a coordinate flag value; used by interactive prompts.
pub fn parse_coordinate(field: &str, raw: &str) -> Result<f64, CliError> {
    f64::from_str(raw.trim()).map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("'{raw}' is not a number"),
    })
}
