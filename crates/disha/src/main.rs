mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use disha_core::LiveView;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let Cli {
        mut global,
        command,
    } = cli;

    match command {
        // Config commands don't need a backend connection
        Command::Config(args) => {
            let cfg = config::load_config()?;
            config::apply_display_defaults(&mut global, &cfg)?;
            commands::config_cmd::handle(args, &global)
        }

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "disha", &mut std::io::stdout());
            Ok(())
        }

        cmd => {
            let cfg = config::load_config()?;
            config::apply_display_defaults(&mut global, &cfg)?;
            let mut view_config = config::resolve_view_config(&global, &cfg)?;
            if let Command::Watch(ref args) = cmd {
                commands::watch::apply_overrides(&mut view_config, args);
            }
            let view = LiveView::connect(view_config)?;

            tracing::debug!(command = ?cmd, url = %view.config().url, "dispatching command");
            commands::dispatch(cmd, &view, &global).await
        }
    }
}
