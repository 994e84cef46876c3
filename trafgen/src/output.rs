use trafgen_core::{ProbeReport, ProgressFn, RunConfig, SessionReport};

use crate::cli::OutputFormat;

mod human;
mod json;

pub(crate) trait OutputFormatter: Send + Sync {
    fn print_header(&self, session_id: &str, cfg: &RunConfig);
    fn progress(&self) -> Option<ProgressFn>;
    fn print_summary(&self, report: &SessionReport) -> anyhow::Result<()>;
    fn print_probe(&self, report: &ProbeReport) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput::new()),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
