//! Traffic signal handlers.

use tabled::Tabled;

use disha_core::{LiveView, Signal};

use crate::cli::{GlobalOpts, SignalsArgs, SignalsCommand};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
pub(crate) struct SignalRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Density")]
    density: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl SignalRow {
    pub(crate) fn new(s: &Signal, color: bool) -> Self {
        let density = format!("{}%", s.density);
        Self {
            id: s.id.clone(),
            location: s.location_name.clone(),
            state: output::signal_state(s.state, color),
            density: if s.is_congested() {
                format!("{density} (congested)")
            } else {
                density
            },
            updated: output::timestamp(s.last_updated),
        }
    }
}

pub(crate) fn render_signals(signals: &[Signal], global: &GlobalOpts) -> Result<String, CliError> {
    let color = output::should_color(&global.color_mode());
    output::render_list(
        &global.format(),
        signals,
        |s| SignalRow::new(s, color),
        |s| s.id.clone(),
    )
}

pub async fn handle(view: &LiveView, args: SignalsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        SignalsCommand::List { congested } => {
            let mut signals = view.fetch_signals().await?;
            if congested {
                signals.retain(Signal::is_congested);
            }
            output::print_output(&render_signals(&signals, global)?, global.quiet);
            Ok(())
        }
        SignalsCommand::Init => {
            util::with_spinner(global, "Seeding signals...", view.initialize_signals()).await?;
            util::status_line(global, "Signals initialized");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use disha_core::SignalState;

    use super::*;

    #[test]
    fn congested_signals_are_flagged() {
        let signal = Signal {
            id: "S1".into(),
            location_name: "Silk Board".into(),
            density: 92,
            state: SignalState::Red,
            position: None,
            last_updated: None,
        };
        let row = SignalRow::new(&signal, false);
        assert_eq!(row.density, "92% (congested)");
        assert_eq!(row.state, "RED");
    }
}
