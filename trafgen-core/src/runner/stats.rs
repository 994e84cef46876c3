use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use trafgen_http::DnsLookup;

use crate::classify::{AttackKind, Behavior, Classification, TrafficClass};
use crate::executor::RequestOutcome;

/// Shared run counters. Workers only ever add to them.
#[derive(Debug)]
pub struct Statistics {
    started_at: DateTime<Utc>,
    started: Instant,

    total: AtomicU64,
    successful: AtomicU64,
    failed: AtomicU64,
    by_class: [AtomicU64; 3],
    by_behavior: [AtomicU64; 5],
    by_attack: [AtomicU64; 4],

    security_events: AtomicU64,
    compromise_activities: AtomicU64,
    dns_lookups: AtomicU64,
    dns_failures: AtomicU64,
    bytes_transferred: AtomicU64,

    latency_us: Mutex<Histogram<u64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    /// Percent of requests that got a status below 400.
    pub success_rate: f64,
    pub requests_per_minute: f64,
    pub by_class: BTreeMap<TrafficClass, u64>,
    pub by_subtype: BTreeMap<String, u64>,
    pub security_events: u64,
    pub compromise_activities: u64,
    pub dns_lookups: u64,
    pub dns_failures: u64,
    pub bytes_transferred: u64,
    pub latency_p50_ms: Option<f64>,
    pub latency_p95_ms: Option<f64>,
    pub latency_p99_ms: Option<f64>,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new()
    }
}

impl Statistics {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            total: AtomicU64::new(0),
            successful: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            by_class: Default::default(),
            by_behavior: Default::default(),
            by_attack: Default::default(),
            security_events: AtomicU64::new(0),
            compromise_activities: AtomicU64::new(0),
            dns_lookups: AtomicU64::new(0),
            dns_failures: AtomicU64::new(0),
            bytes_transferred: AtomicU64::new(0),
            // Up to 10 minutes in microseconds; retried requests can run long.
            latency_us: Mutex::new(
                Histogram::<u64>::new_with_bounds(1, 600_000_000, 3)
                    .unwrap_or_else(|err| panic!("failed to init histogram: {err}")),
            ),
        }
    }

    pub fn record_request(&self, classification: Classification, outcome: &RequestOutcome) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.by_class[classification.class().index()].fetch_add(1, Ordering::Relaxed);
        match classification {
            Classification::Normal => {}
            Classification::Compromised(b) => {
                self.by_behavior[b.index()].fetch_add(1, Ordering::Relaxed);
            }
            Classification::Malicious(a) => {
                self.by_attack[a.index()].fetch_add(1, Ordering::Relaxed);
            }
        }

        if outcome.is_success() {
            self.successful.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(bytes) = outcome.bytes_transferred {
            self.bytes_transferred.fetch_add(bytes, Ordering::Relaxed);
        }

        let us = u64::try_from(outcome.latency.as_micros()).unwrap_or(u64::MAX);
        self.latency_us
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .saturating_record(us.max(1));
    }

    pub fn record_security_event(&self) {
        self.security_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_compromise_activity(&self) {
        self.compromise_activities.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dns(&self, lookup: &DnsLookup) {
        self.dns_lookups.fetch_add(1, Ordering::Relaxed);
        if !lookup.succeeded() {
            self.dns_failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        let duration_secs = self.started.elapsed().as_secs_f64();
        let total = self.total.load(Ordering::Relaxed);
        let successful = self.successful.load(Ordering::Relaxed);

        let by_class = TrafficClass::ALL
            .iter()
            .map(|c| (*c, self.by_class[c.index()].load(Ordering::Relaxed)))
            .collect();

        let mut by_subtype = BTreeMap::new();
        for b in Behavior::ALL {
            by_subtype.insert(b.to_string(), self.by_behavior[b.index()].load(Ordering::Relaxed));
        }
        for a in AttackKind::ALL {
            by_subtype.insert(a.to_string(), self.by_attack[a.index()].load(Ordering::Relaxed));
        }

        let (p50, p95, p99) = {
            let h = self
                .latency_us
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if h.is_empty() {
                (None, None, None)
            } else {
                let ms = |q: f64| Some(h.value_at_quantile(q) as f64 / 1000.0);
                (ms(0.50), ms(0.95), ms(0.99))
            }
        };

        StatsSnapshot {
            started_at: self.started_at,
            duration_secs,
            total_requests: total,
            successful_requests: successful,
            failed_requests: self.failed.load(Ordering::Relaxed),
            success_rate: if total == 0 {
                0.0
            } else {
                successful as f64 / total as f64 * 100.0
            },
            requests_per_minute: if duration_secs > 0.0 {
                total as f64 / (duration_secs / 60.0)
            } else {
                0.0
            },
            by_class,
            by_subtype,
            security_events: self.security_events.load(Ordering::Relaxed),
            compromise_activities: self.compromise_activities.load(Ordering::Relaxed),
            dns_lookups: self.dns_lookups.load(Ordering::Relaxed),
            dns_failures: self.dns_failures.load(Ordering::Relaxed),
            bytes_transferred: self.bytes_transferred.load(Ordering::Relaxed),
            latency_p50_ms: p50,
            latency_p95_ms: p95,
            latency_p99_ms: p99,
        }
    }
}
