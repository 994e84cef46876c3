use std::sync::Arc;

mod format;
mod progress;
mod summary;

use format::{format_bytes, format_duration, format_rate};
use progress::HumanProgress;
use trafgen_core::{ProbeReport, ProgressFn, RunConfig, SessionReport, TrafficClass};

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput {
    progress: Arc<HumanProgress>,
}

impl HumanReadableOutput {
    pub(crate) fn new() -> Self {
        Self {
            progress: Arc::new(HumanProgress::new()),
        }
    }
}

impl OutputFormatter for HumanReadableOutput {
    fn print_header(&self, session_id: &str, cfg: &RunConfig) {
        println!("session: {session_id}");
        println!(
            "duration={} rpm={} workers={} compromise={} malicious={}",
            format_duration(cfg.duration),
            cfg.target_rpm,
            cfg.max_workers,
            band(cfg.enable_compromise, cfg.compromise_probability),
            band(cfg.enable_malicious, cfg.malicious_probability),
        );
        println!("logs: {}", cfg.log_directory.display());
        println!();
    }

    fn progress(&self) -> Option<ProgressFn> {
        let progress = self.progress.clone();

        Some(Arc::new(move |u| {
            let s = &u.stats;
            let class = |c: TrafficClass| s.by_class.get(&c).copied().unwrap_or(0);
            let message = format!(
                "reqs={} ok={} failed={} rpm={} mal={} comp={} tx={}",
                s.total_requests,
                s.successful_requests,
                s.failed_requests,
                format_rate(s.requests_per_minute),
                class(TrafficClass::Malicious),
                class(TrafficClass::Compromised),
                format_bytes(s.bytes_transferred),
            );
            progress.update(&u.session_id, u.elapsed + u.remaining, u.elapsed, message);
        }))
    }

    fn print_summary(&self, report: &SessionReport) -> anyhow::Result<()> {
        self.progress.finish();
        print!("{}", summary::render(report));
        Ok(())
    }

    fn print_probe(&self, report: &ProbeReport) -> anyhow::Result<()> {
        print!("{}", summary::render_probe(report));
        Ok(())
    }
}

fn band(enabled: bool, probability: f64) -> String {
    if enabled {
        format!("{:.0}%", probability * 100.0)
    } else {
        "off".to_string()
    }
}
