use anyhow::Context as _;

use trafgen_core::probe_sites;
use trafgen_http::HttpClient;

use crate::cli::ProbeArgs;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;
use crate::run_support::load_settings;

pub async fn probe(args: ProbeArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);

    if args.sample == 0 {
        return Err(RunError::InvalidInput(anyhow::anyhow!(
            "--sample must be at least 1"
        )));
    }

    let (cfg, catalog) = load_settings(args.config.as_deref(), args.sites.as_deref()).await?;
    let user_agent = cfg
        .user_agents
        .first()
        .cloned()
        .context("no user agents configured")
        .map_err(RunError::InvalidInput)?;

    let client = HttpClient::default();
    let report = probe_sites(&client, &catalog, args.sample, &user_agent, args.timeout).await?;

    out.print_probe(&report)
        .context("failed to print probe report")
        .map_err(RunError::RuntimeError)?;

    if report.reachable == 0 {
        return Err(RunError::RuntimeError(anyhow::anyhow!(
            "none of the {} probed sites were reachable",
            report.probed
        )));
    }

    Ok(ExitCode::Success)
}
