//! Dashboard statistics handler.

use disha_core::{LiveView, Stats};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub(crate) fn detail(s: &Stats) -> String {
    [
        format!("Total incidents:  {}", s.total_incidents),
        format!("Active incidents: {}", s.active_incidents),
        format!("High severity:    {}", s.high_severity_count),
    ]
    .join("\n")
}

pub async fn handle(view: &LiveView, global: &GlobalOpts) -> Result<(), CliError> {
    let stats = view.fetch_stats().await?;
    let out = output::render_single(&global.format(), &stats, detail, |s| {
        format!("{} {} {}", s.total_incidents, s.active_incidents, s.high_severity_count)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
