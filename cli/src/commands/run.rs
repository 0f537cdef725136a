//! Run command: the full first-boot bootstrap.

use anyhow::Result;

use crate::app::AppContext;
use crate::application::services::bootstrap::{BootstrapOptions, run_bootstrap};
use crate::domain::Backoff;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::fs::StdFs;
use crate::infra::http::ReqwestTransport;
use crate::output::TerminalReporter;

/// Entry point for `nodeboot run`.
///
/// # Errors
///
/// Returns an error if the provisioning file is invalid or any bootstrap
/// step fails fatally.
pub async fn run(app: &AppContext) -> Result<()> {
    let context = app.load_context()?;
    let runner = TokioCommandRunner::default();
    let metadata_http = ReqwestTransport::new()?;
    let reporter = TerminalReporter::new(&app.output);
    let backoff = Backoff::from_entropy();

    app.output.header(&format!(
        "Bootstrapping against {}",
        context.installer.hostname
    ));
    let summary = run_bootstrap(
        &runner,
        &metadata_http,
        ReqwestTransport::trusting,
        &StdFs,
        BootstrapOptions {
            context: &context,
            paths: &app.paths,
            reporter: &reporter,
            backoff: &backoff,
        },
    )
    .await?;

    let name = summary.fqdn.as_deref().unwrap_or(&summary.hostname);
    app.output.success(&format!(
        "{name} bootstrapped ({} steps, {} skipped)",
        summary.completed.len(),
        summary.skipped.len()
    ));
    app.output.summary(&summary);
    Ok(())
}
