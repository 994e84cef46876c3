mod progress;
mod rate;
mod session;
mod signal;
mod stats;
mod worker;

pub use progress::{ProgressFn, ProgressUpdate};
pub use rate::RateController;
pub use session::{SessionHandle, SessionManager, SessionReport, SessionState};
pub use signal::StopSignal;
pub use stats::{Statistics, StatsSnapshot};

use crate::catalog::CatalogData;
use crate::config::RunConfig;
use crate::error::Result;

/// Run one session to completion with the given data.
pub async fn run(config: RunConfig, catalog: CatalogData) -> Result<SessionReport> {
    SessionManager::new(catalog).start(config).await?.wait().await
}
