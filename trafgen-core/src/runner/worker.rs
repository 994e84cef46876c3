use std::sync::Arc;
use std::time::Duration;

use rand::Rng as _;
use sha2::{Digest as _, Sha256};
use tokio::time::Instant;

use crate::catalog::PayloadCatalog;
use crate::classify::{Classification, TrafficClassifier};
use crate::config::RunConfig;
use crate::error::Result;
use crate::executor::{Execution, RequestExecutor};
use crate::logs::{LogRouter, LogStream};
use crate::work::WorkItem;

use super::rate::RateController;
use super::signal::StopSignal;
use super::stats::Statistics;

/// Everything one worker shares with the rest of the session.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub worker_id: usize,
    pub config: Arc<RunConfig>,
    pub classifier: Arc<TrafficClassifier>,
    pub catalog: Arc<PayloadCatalog>,
    pub executor: Arc<RequestExecutor>,
    pub rate: Arc<RateController>,
    pub stats: Arc<Statistics>,
    pub logs: Arc<LogRouter>,
    pub stop: Arc<StopSignal>,
    pub deadline: Instant,
}

/// Why a worker left its loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerExit {
    Deadline,
    Stopped,
}

/// A reached deadline wins over a stop that arrived later.
fn exit_reason(ctx: &WorkerContext) -> Option<WorkerExit> {
    if Instant::now() >= ctx.deadline {
        Some(WorkerExit::Deadline)
    } else if ctx.stop.is_stopped() {
        Some(WorkerExit::Stopped)
    } else {
        None
    }
}

/// Run the request loop until the deadline or a stop.
pub(crate) async fn run_worker(ctx: WorkerContext) -> Result<WorkerExit> {
    let mut executed = 0u64;

    let exit = loop {
        if let Some(exit) = exit_reason(&ctx) {
            break exit;
        }

        tokio::select! {
            biased;
            _ = tokio::time::sleep_until(ctx.deadline) => break WorkerExit::Deadline,
            _ = ctx.stop.wait() => break WorkerExit::Stopped,
            _ = ctx.rate.next_slot() => {}
        }

        let item = {
            let mut rng = rand::rng();
            WorkItem::plan(
                &ctx.classifier,
                &ctx.catalog,
                &ctx.config.user_agents,
                ctx.config.referer_probability,
                &mut rng,
            )?
        };

        let execution = ctx.executor.execute(&item, ctx.config.timeout).await;
        record(&ctx, &item, &execution);
        executed += 1;

        if let Some(exit) = exit_reason(&ctx) {
            break exit;
        }

        let pause = human_delay(ctx.config.delay_min, ctx.config.delay_max);
        tokio::select! {
            biased;
            _ = tokio::time::sleep_until(ctx.deadline) => break WorkerExit::Deadline,
            _ = ctx.stop.wait() => break WorkerExit::Stopped,
            _ = tokio::time::sleep(pause) => {}
        }
    };

    tracing::debug!(worker = ctx.worker_id, executed, ?exit, "worker finished");
    Ok(exit)
}

fn human_delay(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    rand::rng().random_range(min..=max)
}

fn emit(logs: &LogRouter, stream: LogStream, fields: &[(&str, String)]) {
    if let Err(err) = logs.emit(stream, fields) {
        tracing::warn!(%stream, error = %err, "failed to write log record");
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn secs(d: Duration) -> String {
    format!("{:.3}", d.as_secs_f64())
}

pub(crate) fn payload_hash(payload: &str) -> String {
    let digest = Sha256::digest(payload.as_bytes());
    let mut hex = hex::encode(digest);
    hex.truncate(16);
    hex
}

fn record(ctx: &WorkerContext, item: &WorkItem, execution: &Execution) {
    let logs = &ctx.logs;
    let outcome = &execution.outcome;

    if let Some(dns) = &execution.dns {
        emit(
            logs,
            LogStream::Dns,
            &[
                ("domain", dns.domain.clone()),
                ("record_type", dns.record_type.to_string()),
                ("elapsed", secs(dns.elapsed)),
            ],
        );
        ctx.stats.record_dns(dns);
    }

    emit(
        logs,
        LogStream::Traffic,
        &[
            ("type", item.class().to_string()),
            ("subtype", or_dash(item.subtype())),
            ("method", item.method.to_string()),
            ("url", item.target.clone()),
            ("status", or_dash(outcome.status)),
            ("elapsed", secs(outcome.latency)),
            ("user_agent", item.user_agent.clone()),
            ("error", or_dash(outcome.error)),
            ("cause", or_dash(outcome.cause)),
            ("attempts", outcome.attempts.to_string()),
        ],
    );

    let payload = item.payload.as_deref().unwrap_or_default();
    match item.classification {
        Classification::Normal => {}
        Classification::Compromised(behavior) => {
            emit(
                logs,
                LogStream::Compromise,
                &[
                    ("activity", behavior.to_string()),
                    ("target", item.target.clone()),
                    ("status", "ATTEMPT".to_string()),
                    ("payload_hash", payload_hash(payload)),
                ],
            );
            ctx.stats.record_compromise_activity();
        }
        Classification::Malicious(kind) => {
            let indicators = serde_json::json!({
                "url": item.target,
                "method": item.method.as_str(),
                "payload": payload,
                "user_agent": item.user_agent,
                "status": outcome.status,
            });
            emit(
                logs,
                LogStream::Security,
                &[
                    ("type", kind.to_string()),
                    ("severity", "high".to_string()),
                    ("description", format!("Simulated {kind} attack")),
                    ("indicators", indicators.to_string()),
                ],
            );
            ctx.stats.record_security_event();
        }
    }

    ctx.stats.record_request(item.classification, outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_hash_is_a_short_sha256_prefix() {
        // sha256("abc") = ba7816bf8f01cfea...
        assert_eq!(payload_hash("abc"), "ba7816bf8f01cfea");
        assert_eq!(payload_hash("").len(), 16);
    }

    #[test]
    fn delay_stays_in_range() {
        let min = Duration::from_millis(10);
        let max = Duration::from_millis(20);
        for _ in 0..100 {
            let d = human_delay(min, max);
            assert!(d >= min && d <= max);
        }
        assert_eq!(human_delay(max, max), max);
    }

    #[test]
    fn missing_values_render_as_dash() {
        assert_eq!(or_dash(None::<u16>), "-");
        assert_eq!(or_dash(Some(404)), "404");
        assert_eq!(secs(Duration::from_millis(1500)), "1.500");
    }
}
