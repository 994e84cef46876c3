use std::time::Duration;

use super::stats::StatsSnapshot;

#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    /// Monotonic tick counter (1-based) for progress emissions.
    pub tick: u64,
    pub session_id: String,
    pub elapsed: Duration,
    pub remaining: Duration,
    pub stats: StatsSnapshot,
}

pub type ProgressFn = std::sync::Arc<dyn Fn(ProgressUpdate) + Send + Sync + 'static>;
