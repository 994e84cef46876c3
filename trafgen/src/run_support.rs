use std::path::Path;

use trafgen_core::{CatalogData, RunConfig};

use crate::cli::RunArgs;
use crate::config_file::FileConfig;
use crate::run_error::RunError;
use crate::sites::load_sites;

/// Defaults, then the config file, then the `--sites` list.
pub(crate) async fn load_settings(
    config: Option<&Path>,
    sites: Option<&Path>,
) -> Result<(RunConfig, CatalogData), RunError> {
    let mut cfg = RunConfig::default();
    let mut catalog = CatalogData::builtin();

    if let Some(path) = config {
        FileConfig::load(path)
            .await
            .map_err(RunError::InvalidInput)?
            .apply(&mut cfg, &mut catalog);
    }

    if let Some(path) = sites {
        let sites = load_sites(path).await.map_err(RunError::InvalidInput)?;
        catalog = catalog.with_sites(sites);
    }

    Ok((cfg, catalog))
}

pub(crate) fn apply_run_flags(args: &RunArgs, cfg: &mut RunConfig) {
    if let Some(duration) = args.duration {
        cfg.duration = duration;
    }
    if let Some(rpm) = args.rpm {
        cfg.target_rpm = rpm;
    }
    if let Some(workers) = args.workers {
        cfg.max_workers = workers;
    }
    if args.no_compromise {
        cfg.enable_compromise = false;
    }
    if args.no_malicious {
        cfg.enable_malicious = false;
    }
    if let Some(dir) = &args.log_dir {
        cfg.log_directory = dir.clone();
    }
}
