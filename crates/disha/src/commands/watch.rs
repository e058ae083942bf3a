//! Live dashboard: polls the backend, prints changes as they land, and
//! takes line commands on stdin for route inspection and simulations.

use std::fmt::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use disha_core::{CoreError, InspectionState, LiveView, NoticeLevel, SelectOutcome, ViewConfig};

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::{incidents::IncidentRow, routes, signals::SignalRow, stats};

const HELP: &str = "commands: select <id> | close | ambulance | random | refresh | help | quit";

/// Fold watch flags into the view config before connecting.
pub fn apply_overrides(config: &mut ViewConfig, args: &WatchArgs) {
    if let Some(interval) = args.interval {
        config.poll_interval = interval;
    }
    if args.no_init {
        config.initialize_signals = false;
    }
}

// ── Input ───────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum WatchInput {
    Select(String),
    Close,
    Ambulance,
    Random,
    Refresh,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_input(line: &str) -> WatchInput {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return WatchInput::Empty;
    };
    match head.to_ascii_lowercase().as_str() {
        "select" | "s" | "inspect" => match words.next() {
            Some(id) => WatchInput::Select(id.to_owned()),
            None => WatchInput::Unknown("select needs an incident id".into()),
        },
        "close" | "c" => WatchInput::Close,
        "ambulance" | "a" | "emergency" => WatchInput::Ambulance,
        "random" | "n" => WatchInput::Random,
        "refresh" | "r" => WatchInput::Refresh,
        "help" | "h" | "?" => WatchInput::Help,
        "quit" | "q" | "exit" => WatchInput::Quit,
        other => WatchInput::Unknown(format!("unknown command '{other}'")),
    }
}

// ── Rendering ───────────────────────────────────────────────────────

fn dashboard(view: &LiveView, color: bool) -> String {
    let store = view.store();
    let mut out = String::new();

    let _ = writeln!(out, "{}", output::heading("Stats", color));
    let _ = writeln!(out, "{}\n", stats::detail(&store.stats()));

    let incidents: Vec<IncidentRow> = store
        .incidents_snapshot()
        .iter()
        .map(|i| IncidentRow::new(i, color))
        .collect();
    let _ = writeln!(
        out,
        "{}",
        output::heading(&format!("Active incidents ({})", incidents.len()), color)
    );
    let _ = writeln!(out, "{}\n", output::render_table(&incidents));

    let signals: Vec<SignalRow> = store
        .signals_snapshot()
        .iter()
        .map(|s| SignalRow::new(s, color))
        .collect();
    let _ = writeln!(
        out,
        "{}",
        output::heading(&format!("Signals ({})", signals.len()), color)
    );
    let _ = write!(out, "{}", output::render_table(&signals));

    if let Some(at) = store.last_refresh() {
        let _ = write!(out, "\nlast refresh {}", output::timestamp(Some(at)));
    }
    out
}

fn inspection_panel(state: &InspectionState, color: bool) -> String {
    match state {
        InspectionState::Idle => "Route inspection closed; live updates resumed.".into(),
        InspectionState::Inspecting {
            incident_id,
            route: None,
        } => format!("AI is analyzing routes for {incident_id}... (live incident updates paused)"),
        InspectionState::Inspecting {
            route: Some(route), ..
        } => routes::detail(route, color),
    }
}

// ── Commands ────────────────────────────────────────────────────────

fn run_input(view: &LiveView, input: WatchInput, color: bool) {
    match input {
        WatchInput::Select(id) => {
            let view = view.clone();
            tokio::spawn(async move {
                match view.select_incident(&id).await {
                    Ok(SelectOutcome::Pending) => {
                        eprintln!("{}", output::notice(NoticeLevel::Info, "still loading", color));
                    }
                    Ok(outcome) => tracing::debug!(?outcome, "selection finished"),
                    // The session already published a notice.
                    Err(e) => tracing::debug!(error = %e, "selection failed"),
                }
            });
        }
        WatchInput::Close => {
            if !view.dismiss_route() {
                eprintln!("nothing selected");
            }
        }
        WatchInput::Ambulance => {
            let view = view.clone();
            tokio::spawn(async move {
                if let Err(e) = view.simulate_emergency().await {
                    report_failure("Emergency simulation failed", &e, color);
                }
            });
        }
        WatchInput::Random => {
            let view = view.clone();
            tokio::spawn(async move {
                if let Err(e) = view.simulate_random_incident().await {
                    report_failure("Random incident failed", &e, color);
                }
            });
        }
        WatchInput::Refresh => {
            let view = view.clone();
            tokio::spawn(async move {
                let report = view.tick().await;
                for (resource, reason) in report.failures() {
                    eprintln!(
                        "{}",
                        output::notice(
                            NoticeLevel::Warning,
                            &format!("{resource} refresh failed: {reason}"),
                            color
                        )
                    );
                }
            });
        }
        WatchInput::Help => eprintln!("{HELP}"),
        WatchInput::Unknown(msg) => eprintln!("{msg}\n{HELP}"),
        WatchInput::Empty | WatchInput::Quit => {}
    }
}

fn report_failure(what: &str, err: &CoreError, color: bool) {
    eprintln!(
        "{}",
        output::notice(NoticeLevel::Error, &format!("{what}: {err}"), color)
    );
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(view: &LiveView, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color_mode());
    let mut notices = view.subscribe_notices();

    let Some(report) = view.activate().await else {
        return Err(CliError::Internal("live view is already running".into()));
    };
    let failures = report.failures();
    if report.incidents.is_failed() && report.signals.is_failed() && report.stats.is_failed() {
        view.deactivate().await;
        return Err(CliError::ConnectionFailed {
            url: view.config().url.to_string(),
            source: failures
                .iter()
                .map(|(r, why)| format!("{r}: {why}"))
                .collect::<Vec<_>>()
                .join("; ")
                .into(),
        });
    }
    for (resource, reason) in failures {
        tracing::warn!(%resource, reason, "initial refresh incomplete");
    }

    // Subscribed after the initial refresh so it is not reported twice.
    let store = view.store();
    let mut incidents = store.subscribe_incidents();
    let mut signals = store.subscribe_signals();
    let mut stats_rx = store.subscribe_stats();
    let mut inspection = view.subscribe_inspection();

    output::print_output(&dashboard(view, color), false);
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(line)) => match parse_input(&line) {
                    WatchInput::Quit => break,
                    input => run_input(view, input, color),
                },
                Ok(None) => stdin_open = false,
                Err(e) => {
                    tracing::warn!(error = %e, "stdin closed");
                    stdin_open = false;
                }
            },

            notice = notices.recv() => match notice {
                Ok(n) => eprintln!("{}", output::notice(n.level, &n.message, color)),
                Err(RecvError::Lagged(skipped)) => tracing::debug!(skipped, "notices lagged"),
                Err(RecvError::Closed) => break,
            },

            Some(_) = incidents.changed() => output::print_output(&dashboard(view, color), false),
            Some(_) = signals.changed() => output::print_output(&dashboard(view, color), false),
            Ok(()) = stats_rx.changed() => output::print_output(&dashboard(view, color), false),

            Ok(()) = inspection.changed() => {
                let state = inspection.borrow_and_update().clone();
                output::print_output(&inspection_panel(&state, color), false);
            }
        }
    }

    view.deactivate().await;
    Ok(())
}
