//! Backend reachability check.

use disha_core::LiveView;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(view: &LiveView, global: &GlobalOpts) -> Result<(), CliError> {
    let url = view.config().url.to_string();
    let info = view.backend_info().await?;
    tracing::debug!(%url, version = ?info.version, "backend reachable");
    let out = output::render_single(
        &global.format(),
        &info,
        |i| {
            [
                format!("Backend: {url}"),
                format!("Message: {}", i.message),
                format!("Version: {}", i.version.as_deref().unwrap_or("-")),
            ]
            .join("\n")
        },
        |i| i.message.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
