//! Command dispatch: bridges CLI args -> live view calls -> output formatting.

pub mod config_cmd;
pub mod incidents;
pub mod routes;
pub mod signals;
pub mod simulate;
pub mod stats;
pub mod status;
pub mod util;
pub mod watch;

use disha_core::LiveView;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, view: &LiveView, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Incidents(args) => incidents::handle(view, args, global).await,
        Command::Routes(args) => routes::handle(view, args, global).await,
        Command::Signals(args) => signals::handle(view, args, global).await,
        Command::Stats => stats::handle(view, global).await,
        Command::Simulate(args) => simulate::handle(view, args, global).await,
        Command::Watch(_) => watch::handle(view, global).await,
        Command::Status => status::handle(view, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a backend connection".into(),
        )),
    }
}
