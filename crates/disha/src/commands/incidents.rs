//! Incident command handlers.

use dialoguer::{Input, Select};
use tabled::Tabled;

use disha_core::{GeoPoint, Incident, IncidentDraft, IncidentKind, LiveView, Severity};

use crate::cli::{GlobalOpts, IncidentsArgs, IncidentsCommand, ReportArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

use super::{routes, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct IncidentRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Reported")]
    reported: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl IncidentRow {
    pub(crate) fn new(i: &Incident, color: bool) -> Self {
        Self {
            id: i.id.clone(),
            kind: i.kind.label().into(),
            severity: output::severity(i.severity, color),
            status: i.status.clone(),
            location: format!("{:.4}, {:.4}", i.location.lat, i.location.lng),
            reported: output::timestamp(i.reported_at),
            description: output::truncate(&i.description, 40),
        }
    }
}

pub(crate) fn detail(i: &Incident, color: bool) -> String {
    let mut lines = vec![
        format!("ID:          {}", i.id),
        format!("Type:        {}", i.kind.label()),
        format!("Severity:    {}", output::severity(i.severity, color)),
        format!("Status:      {}", i.status),
        format!("Location:    {:.5}, {:.5}", i.location.lat, i.location.lng),
        format!("Reported:    {}", output::timestamp(i.reported_at)),
        format!("Description: {}", i.description),
    ];
    if let Some(ref name) = i.reporter_name {
        lines.push(format!("Reporter:    {name}"));
    }
    if let Some(ref url) = i.photo_url {
        lines.push(format!("Photo:       {url}"));
    }
    lines.join("\n")
}

pub(crate) fn render_incidents(incidents: &[Incident], global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(&global.color_mode());
    output::render_list(
        &global.format(),
        incidents,
        |i| IncidentRow::new(i, color),
        |i| i.id.clone(),
    )
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(view: &LiveView, args: IncidentsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color_mode());

    match args.command {
        IncidentsCommand::List { all, status } => {
            let incidents = match (all, status) {
                (true, _) => view.list_incidents(None).await?,
                (false, Some(status)) => view.list_incidents(Some(&status)).await?,
                (false, None) => view.fetch_active_incidents().await?,
            };
            output::print_output(&render_incidents(&incidents, global)?, global.quiet);
            Ok(())
        }

        IncidentsCommand::Get { id } => {
            let incident = view.get_incident(&id).await?;
            let out = output::render_single(
                &global.format(),
                &incident,
                |i| detail(i, color),
                |i| i.id.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IncidentsCommand::Report(report) => {
            let wait = report.wait_routes;
            let draft = build_draft(report, view.config().home)?;
            draft.validate()?;

            if wait {
                let outcome = util::with_spinner(
                    global,
                    "Reporting incident and waiting for route analysis...",
                    view.report_and_analyze(&draft),
                )
                .await?;
                let out = output::render_single(
                    &global.format(),
                    &outcome,
                    |o| {
                        let mut text = detail(&o.incident, color);
                        match o.routes {
                            Some(ref r) => {
                                text.push_str("\n\n");
                                text.push_str(&routes::detail(r, color));
                            }
                            None => text.push_str("\n\nRoute analysis is not available yet."),
                        }
                        text
                    },
                    |o| o.incident.id.clone(),
                )?;
                output::print_output(&out, global.quiet);
            } else {
                let incident =
                    util::with_spinner(global, "Reporting incident...", view.report_incident(&draft))
                        .await?;
                let out = output::render_single(
                    &global.format(),
                    &incident,
                    |i| detail(i, color),
                    |i| i.id.clone(),
                )?;
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }
    }
}

// ── Draft assembly ──────────────────────────────────────────────────

/// Fill in whatever the flags left out, prompting when attached to a
/// terminal.
fn build_draft(args: ReportArgs, home: GeoPoint) -> Result<IncidentDraft, CliError> {
    let prompt = util::interactive();
    let kind = match args.kind {
        Some(kind) => kind,
        None if prompt => prompt_kind()?,
        None => return Err(missing("type")),
    };
    let severity = match args.severity {
        Some(severity) => severity,
        None if prompt => prompt_severity()?,
        None => return Err(missing("severity")),
    };
    let description = match args.description {
        Some(text) => text,
        None if prompt => Input::new()
            .with_prompt("Description")
            .interact_text()
            .map_err(util::prompt_err)?,
        None => return Err(missing("description")),
    };
    let location = match (args.lat, args.lng) {
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng),
        _ if prompt => prompt_location(home)?,
        _ => home,
    };

    let mut draft = IncidentDraft::new(kind, severity, description, location);
    if let Some(name) = args.reporter {
        draft = draft.with_reporter(name);
    }
    if let Some(url) = args.photo_url {
        draft = draft.with_photo_url(url);
    }
    Ok(draft)
}

fn missing(field: &str) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: format!("--{field} is required when not running interactively"),
    }
}

const REPORTABLE: [IncidentKind; 4] = [
    IncidentKind::TrafficJam,
    IncidentKind::Accident,
    IncidentKind::RoadWork,
    IncidentKind::Emergency,
];

fn prompt_kind() -> Result<IncidentKind, CliError> {
    let labels: Vec<&str> = REPORTABLE.iter().map(|k| k.label()).collect();
    let idx = Select::new()
        .with_prompt("Incident type")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(util::prompt_err)?;
    REPORTABLE
        .get(idx)
        .copied()
        .ok_or_else(|| CliError::Prompt("no type selected".into()))
}

fn prompt_severity() -> Result<Severity, CliError> {
    let labels: Vec<String> = Severity::KNOWN.iter().map(ToString::to_string).collect();
    let idx = Select::new()
        .with_prompt("Severity")
        .items(&labels)
        .default(1)
        .interact()
        .map_err(util::prompt_err)?;
    Severity::KNOWN
        .get(idx)
        .copied()
        .ok_or_else(|| CliError::Prompt("no severity selected".into()))
}

fn prompt_location(home: GeoPoint) -> Result<GeoPoint, CliError> {
    let lat: String = Input::new()
        .with_prompt("Latitude")
        .default(home.lat.to_string())
        .interact_text()
        .map_err(util::prompt_err)?;
    let lng: String = Input::new()
        .with_prompt("Longitude")
        .default(home.lng.to_string())
        .interact_text()
        .map_err(util::prompt_err)?;
    Ok(GeoPoint::new(
        config::parse_coordinate("lat", &lat)?,
        config::parse_coordinate("lng", &lng)?,
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args() -> ReportArgs {
        ReportArgs {
            kind: Some(IncidentKind::Accident),
            severity: Some(Severity::High),
            description: Some("multi-car collision".into()),
            lat: Some(12.97),
            lng: Some(77.59),
            reporter: Some("Asha".into()),
            photo_url: None,
            wait_routes: false,
        }
    }

    #[test]
    fn flags_build_a_complete_draft() {
        let draft = build_draft(args(), GeoPoint::BANGALORE).unwrap();
        assert_eq!(draft.kind, IncidentKind::Accident);
        assert_eq!(draft.location, GeoPoint::new(12.97, 77.59));
        assert_eq!(draft.reporter_name.as_deref(), Some("Asha"));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn row_shows_label_and_short_description() {
        let incident = Incident {
            id: "inc-1".into(),
            kind: IncidentKind::TrafficJam,
            severity: Severity::Low,
            description: "slow traffic all the way from the flyover to the junction".into(),
            location: GeoPoint::BANGALORE,
            reporter_name: None,
            photo_url: None,
            status: "active".into(),
            reported_at: None,
        };
        let row = IncidentRow::new(&incident, false);
        assert_eq!(row.kind, "Traffic jam");
        assert_eq!(row.severity, "low");
        assert_eq!(row.description.chars().count(), 40);
        assert!(detail(&incident, false).contains("Status:      active"));
    }
}
