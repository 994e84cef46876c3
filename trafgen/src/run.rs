use anyhow::Context as _;

use trafgen_core::SessionManager;

use crate::cli::RunArgs;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;
use crate::run_support::{apply_run_flags, load_settings};

pub async fn run(args: RunArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);

    let (mut cfg, catalog) = load_settings(args.config.as_deref(), args.sites.as_deref()).await?;
    apply_run_flags(&args, &mut cfg);

    let mut manager = SessionManager::new(catalog);
    if let Some(progress) = out.progress() {
        manager = manager.with_progress(progress);
    }

    let header_cfg = cfg.clone();
    let handle = manager.start(cfg).await?;
    out.print_header(handle.session_id(), &header_cfg);

    let stop = handle.stop_signal();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received, stopping workers");
            stop.stop();
        }
    });

    let report = handle.wait().await;
    ctrl_c.abort();
    let report = report?;

    out.print_summary(&report)
        .context("failed to print summary")
        .map_err(RunError::RuntimeError)?;

    Ok(ExitCode::Success)
}
