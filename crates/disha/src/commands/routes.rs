//! Route suggestion handler.

use disha_core::{LiveView, RouteSuggestion};

use crate::cli::{GlobalOpts, RoutesArgs};
use crate::error::CliError;
use crate::output;

use super::util;

pub(crate) fn detail(r: &RouteSuggestion, color: bool) -> String {
    [
        output::heading(&format!("Routes for {}", r.incident_id), color),
        format!("AI:       {}", r.ai_message),
        format!("Safe:     {}", r.safe_route),
        format!("Eco:      {}", r.eco_route),
        format!("Fastest:  {}", r.fastest_route),
        format!("Updated:  {}", output::timestamp(r.generated_at)),
    ]
    .join("\n")
}

pub async fn handle(view: &LiveView, args: RoutesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color_mode());
    let route = util::with_spinner(
        global,
        "Loading route suggestions...",
        view.fetch_route(&args.incident_id),
    )
    .await?;
    let out = output::render_single(
        &global.format(),
        &route,
        |r| detail(r, color),
        |r| r.fastest_route.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
