#![forbid(unsafe_code)]

mod catalog;
mod classify;
mod config;
mod error;
mod executor;
mod logs;
mod probe;
mod work;

pub mod runner;

pub use catalog::{CatalogData, PayloadCatalog, ResolvedTarget, Site, builtin_user_agents};
pub use classify::{
    AttackKind, Behavior, ClassPolicy, Classification, TrafficClass, TrafficClassifier,
};
pub use config::RunConfig;
pub use error::{ConfigError, Error, Result};
pub use executor::{ErrorKind, Execution, RequestExecutor, RequestOutcome};
pub use logs::{LogRouter, LogStream, format_line, parse_line};
pub use probe::{ProbeReport, ProbeResult, probe_sites};
pub use runner::{
    ProgressFn, ProgressUpdate, SessionHandle, SessionManager, SessionReport, SessionState,
    StatsSnapshot, run,
};
pub use trafgen_http::RetryPolicy;
pub use work::WorkItem;
