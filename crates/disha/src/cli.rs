//! Clap derive structures for the `disha` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use disha_core::{IncidentKind, Severity};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// disha -- live traffic incidents, signals and route analysis
#[derive(Debug, Parser)]
#[command(
    name = "disha",
    version,
    about = "Traffic incident monitoring from the command line",
    long_about = "Traffic incident monitoring from the command line.\n\n\
        A client for the Disha traffic backend. \
        Lists and reports incidents, inspects AI route suggestions,\n\
        watches signals and statistics live, and triggers simulations.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend base URL (overrides the config file)
    #[arg(long, short = 'u', env = "DISHA_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format [default: table]
    #[arg(long, short = 'o', env = "DISHA_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "DISHA_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "DISHA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

impl GlobalOpts {
    pub fn format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, inspect and report incidents
    #[command(alias = "inc", alias = "i")]
    Incidents(IncidentsArgs),

    /// Show AI route suggestions for an incident
    #[command(alias = "r")]
    Routes(RoutesArgs),

    /// View and seed traffic signals
    #[command(alias = "sig")]
    Signals(SignalsArgs),

    /// Show the incident dashboard counters
    Stats,

    /// Trigger simulations on the backend
    #[command(alias = "sim")]
    Simulate(SimulateArgs),

    /// Live-updating view with route inspection
    Watch(WatchArgs),

    /// Check backend reachability
    Status,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Incidents ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct IncidentsArgs {
    #[command(subcommand)]
    pub command: IncidentsCommand,
}

#[derive(Debug, Subcommand)]
pub enum IncidentsCommand {
    /// List incidents (active only unless --all or --status)
    #[command(alias = "ls")]
    List {
        /// Include resolved incidents
        #[arg(long, short = 'a', conflicts_with = "status")]
        all: bool,

        /// Only incidents with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show a single incident
    Get {
        /// Incident ID
        id: String,
    },

    /// Report a new incident
    Report(ReportArgs),
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Incident type (prompted when omitted)
    #[arg(long = "type", short = 't', value_parser = parse_kind)]
    pub kind: Option<IncidentKind>,

    /// Severity (prompted when omitted)
    #[arg(long, short = 's', value_parser = parse_severity)]
    pub severity: Option<Severity>,

    /// What happened (prompted when omitted)
    #[arg(long, short = 'd')]
    pub description: Option<String>,

    /// Latitude (defaults to the configured home point)
    #[arg(long, allow_hyphen_values = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Longitude (defaults to the configured home point)
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lng: Option<f64>,

    /// Reporter name
    #[arg(long)]
    pub reporter: Option<String>,

    /// Photo URL
    #[arg(long)]
    pub photo_url: Option<String>,

    /// Wait for the route analysis and print it
    #[arg(long, short = 'w')]
    pub wait_routes: bool,
}

fn parse_kind(raw: &str) -> Result<IncidentKind, String> {
    match IncidentKind::from_wire(raw) {
        IncidentKind::Unknown => Err(format!(
            "expected one of: {}",
            known_names(&[
                IncidentKind::TrafficJam,
                IncidentKind::Accident,
                IncidentKind::RoadWork,
                IncidentKind::Emergency,
            ])
        )),
        kind => Ok(kind),
    }
}

fn parse_severity(raw: &str) -> Result<Severity, String> {
    match Severity::from_wire(raw) {
        Severity::Unknown => Err(format!("expected one of: {}", known_names(&Severity::KNOWN))),
        severity => Ok(severity),
    }
}

fn known_names<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Routes ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct RoutesArgs {
    /// Incident ID
    pub incident_id: String,
}

// ── Signals ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SignalsArgs {
    #[command(subcommand)]
    pub command: SignalsCommand,
}

#[derive(Debug, Subcommand)]
pub enum SignalsCommand {
    /// List traffic signals
    #[command(alias = "ls")]
    List {
        /// Only signals above the congestion threshold
        #[arg(long)]
        congested: bool,
    },

    /// Ask the backend to seed its default signals
    Init,
}

// ── Simulate ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[command(subcommand)]
    pub command: SimulateCommand,
}

#[derive(Debug, Subcommand)]
pub enum SimulateCommand {
    /// Push the configured emergency-vehicle scenario
    #[command(alias = "ambulance")]
    Emergency {
        /// Road to clear (defaults to the configured emergency road)
        #[arg(long)]
        road: Option<String>,
    },

    /// Report a random incident near the home point
    Incident {
        /// How many incidents to create
        #[arg(long, short = 'n', default_value = "1", value_parser = clap::value_parser!(u32).range(1..=50))]
        count: u32,
    },

    /// Push an arbitrary traffic reading
    Traffic {
        /// Road identifier
        #[arg(long)]
        road: String,

        /// Vehicle density (0-100)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        density: u8,

        /// Average speed in km/h
        #[arg(long)]
        speed: f64,

        /// An emergency vehicle was detected
        #[arg(long)]
        emergency: bool,
    },
}

// ── Watch ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Poll interval (e.g. 5s, 1m)
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Skip seeding signals on startup
    #[arg(long)]
    pub no_init: bool,
}

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive setup wizard
    Init,

    /// Show the effective configuration
    Show,

    /// Print the config file path
    Path,
}

// ── Completions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn report_parses_wire_names() {
        let cli = Cli::try_parse_from([
            "disha", "incidents", "report", "--type", "accident", "--severity", "high",
            "--description", "pileup", "--lat", "12.97", "--lng", "77.59",
        ])
        .unwrap();
        let Command::Incidents(IncidentsArgs {
            command: IncidentsCommand::Report(args),
        }) = cli.command
        else {
            panic!("expected incidents report");
        };
        assert_eq!(args.kind, Some(IncidentKind::Accident));
        assert_eq!(args.severity, Some(Severity::High));
        assert_eq!(args.lat, Some(12.97));
    }

    #[test]
    fn report_rejects_unknown_type() {
        let err = Cli::try_parse_from(["disha", "incidents", "report", "--type", "meteor"])
            .unwrap_err();
        assert!(err.to_string().contains("traffic_jam"));
    }

    #[test]
    fn traffic_density_is_bounded() {
        let res = Cli::try_parse_from([
            "disha", "simulate", "traffic", "--road", "R1", "--density", "120", "--speed", "10",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn watch_interval_uses_humantime() {
        let cli = Cli::try_parse_from(["disha", "watch", "--interval", "2s"]).unwrap();
        let Command::Watch(args) = cli.command else {
            panic!("expected watch");
        };
        assert_eq!(args.interval, Some(Duration::from_secs(2)));
    }
}
