//! Simulation triggers.

use disha_core::{LiveView, SimulationOutcome, TrafficSimulation};

use crate::cli::{GlobalOpts, SimulateArgs, SimulateCommand};
use crate::error::CliError;
use crate::output;

use super::{incidents, util};

fn outcome_detail(o: &SimulationOutcome, color: bool) -> String {
    [
        format!("Signal:  {}", o.signal_id.as_deref().unwrap_or("-")),
        format!(
            "State:   {}",
            o.new_state
                .map_or_else(|| "-".into(), |s| output::signal_state(s, color))
        ),
        format!(
            "Density: {}",
            o.density.map_or_else(|| "-".into(), |d| format!("{d}%"))
        ),
    ]
    .join("\n")
}

fn print_outcome(outcome: &SimulationOutcome, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color_mode());
    let out = output::render_single(
        &global.format(),
        outcome,
        |o| outcome_detail(o, color),
        |o| o.signal_id.clone().unwrap_or_default(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(view: &LiveView, args: SimulateArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SimulateCommand::Emergency { road } => {
            let profile = &view.config().emergency;
            let message = format!(
                "Dispatching emergency vehicle on {}...",
                road.as_deref().unwrap_or(&profile.road_id)
            );
            let outcome = match road {
                Some(road) => {
                    let params = TrafficSimulation::new(road, profile.density, profile.avg_speed)
                        .with_emergency_vehicle(true);
                    util::with_spinner(global, &message, view.simulate_traffic(&params)).await?
                }
                None => util::with_spinner(global, &message, view.simulate_emergency()).await?,
            };
            util::status_line(global, "Emergency vehicle detected! Signals updated for green wave.");
            print_outcome(&outcome, global)
        }

        SimulateCommand::Incident { count } => {
            let mut created = Vec::new();
            for n in 1..=count {
                let incident = util::with_spinner(
                    global,
                    &format!("Creating random incident {n}/{count}..."),
                    view.simulate_random_incident(),
                )
                .await?;
                created.push(incident);
            }
            output::print_output(&incidents::render_incidents(&created, global)?, global.quiet);
            Ok(())
        }

        SimulateCommand::Traffic {
            road,
            density,
            speed,
            emergency,
        } => {
            if !speed.is_finite() || speed < 0.0 {
                return Err(CliError::Validation {
                    field: "speed".into(),
                    reason: format!("expected a non-negative number, got {speed}"),
                });
            }
            let params = TrafficSimulation::new(road, density, speed).with_emergency_vehicle(emergency);
            let outcome = view.simulate_traffic(&params).await?;
            print_outcome(&outcome, global)
        }
    }
}
