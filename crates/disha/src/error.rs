//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use disha_config::ConfigError;
use disha_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not reach the backend at {url}")]
    #[diagnostic(
        code(disha::connection_failed),
        help(
            "Check that the backend is running and accessible.\n\
             URL: {url}\n\
             Try: disha status"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(disha::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout,

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(disha::not_found),
        help("Run: disha {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("Backend error: {message}")]
    #[diagnostic(code(disha::api_error))]
    Api { message: String, status: Option<u16> },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(disha::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("No backend URL configured")]
    #[diagnostic(
        code(disha::no_api_url),
        help(
            "Pass --api-url, set DISHA_API_URL, or run: disha config init\n\
             Config file: {path}"
        )
    )]
    NoApiUrl { path: String },

    #[error(transparent)]
    #[diagnostic(code(disha::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Prompt failed: {0}")]
    #[diagnostic(
        code(disha::prompt),
        help("Pass the missing values as flags in non-interactive contexts.")
    )]
    Prompt(String),

    // ── Internal / IO / Serialization ────────────────────────────────

    #[error("{0}")]
    #[diagnostic(code(disha::internal))]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render output: {0}")]
    #[diagnostic(code(disha::render))]
    Render(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NoApiUrl { .. } | Self::Prompt(_) => exit_code::USAGE,
            Self::Api {
                status: Some(400..=499),
                ..
            } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::Timeout => Self::Timeout,
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                list_command: format!("{}s list", entity_type.to_lowercase()),
                resource_type: entity_type,
                identifier,
            },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::Api { message, status } => Self::Api { message, status },
            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
            CoreError::Internal(message) => Self::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::MissingApiUrl => Self::NoApiUrl {
                path: disha_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let cases = [
            (
                CoreError::ConnectionFailed {
                    url: "http://x".into(),
                    reason: "refused".into(),
                },
                exit_code::CONNECTION,
            ),
            (CoreError::Timeout, exit_code::TIMEOUT),
            (
                CoreError::NotFound {
                    entity_type: "Incident".into(),
                    identifier: "inc-9".into(),
                },
                exit_code::NOT_FOUND,
            ),
            (
                CoreError::ValidationFailed {
                    message: "description is required".into(),
                },
                exit_code::USAGE,
            ),
            (
                CoreError::Api {
                    message: "boom".into(),
                    status: Some(500),
                },
                exit_code::GENERAL,
            ),
            (
                CoreError::Api {
                    message: "bad payload".into(),
                    status: Some(422),
                },
                exit_code::USAGE,
            ),
        ];
        for (core, code) in cases {
            assert_eq!(CliError::from(core).exit_code(), code);
        }
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "Incident".into(),
            identifier: "inc-9".into(),
        });
        let CliError::NotFound { list_command, .. } = err else {
            panic!("expected NotFound");
        };
        assert_eq!(list_command, "incidents list");
    }

    #[test]
    fn missing_url_is_a_usage_error() {
        let err = CliError::from(ConfigError::MissingApiUrl);
        assert!(matches!(err, CliError::NoApiUrl { .. }));
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn config_file_errors_are_general_failures() {
        let err = CliError::from(ConfigError::Io(std::io::Error::other("denied")));
        assert!(matches!(err, CliError::Config(_)));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }
}
