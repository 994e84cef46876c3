use serde::Serialize;
use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use trafgen_core::{ProbeReport, ProgressFn, RunConfig, SessionReport, StatsSnapshot};

use super::OutputFormatter;

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn print_header(&self, _session_id: &str, _cfg: &RunConfig) {}

    fn progress(&self) -> Option<ProgressFn> {
        Some(Arc::new(move |u| {
            let line = JsonProgressLine {
                kind: "progress",
                tick: u.tick,
                session_id: &u.session_id,
                elapsed_secs: u.elapsed.as_secs_f64(),
                remaining_secs: u.remaining.as_secs_f64(),
                stats: &u.stats,
            };
            emit_json_line(&line);
        }))
    }

    fn print_summary(&self, report: &SessionReport) -> anyhow::Result<()> {
        let line = JsonSummaryLine {
            kind: "summary",
            session_id: &report.session_id,
            state: report.state.as_ref(),
            log_directory: &report.log_directory,
            stats: &report.stats,
        };
        emit_json_line(&line);
        Ok(())
    }

    fn print_probe(&self, report: &ProbeReport) -> anyhow::Result<()> {
        let line = JsonProbeLine {
            kind: "probe",
            probed: report.probed,
            reachable: report.reachable,
            results: report
                .results
                .iter()
                .map(|r| JsonProbeResult {
                    url: &r.url,
                    status: r.status,
                    error: r.error.as_deref(),
                    elapsed_ms: r.elapsed.as_millis() as u64,
                    reachable: r.reachable(),
                })
                .collect(),
        };
        emit_json_line(&line);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct JsonProgressLine<'a> {
    kind: &'static str,
    tick: u64,
    session_id: &'a str,
    elapsed_secs: f64,
    remaining_secs: f64,
    stats: &'a StatsSnapshot,
}

#[derive(Debug, Serialize)]
struct JsonSummaryLine<'a> {
    kind: &'static str,
    session_id: &'a str,
    state: &'a str,
    log_directory: &'a Path,
    stats: &'a StatsSnapshot,
}

#[derive(Debug, Serialize)]
struct JsonProbeLine<'a> {
    kind: &'static str,
    probed: usize,
    reachable: usize,
    results: Vec<JsonProbeResult<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonProbeResult<'a> {
    url: &'a str,
    status: Option<u16>,
    error: Option<&'a str>,
    elapsed_ms: u64,
    reachable: bool,
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
    }
}
