use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
struct SlotState {
    start: Option<Instant>,
    next: u64,
}

/// Hands out request slots spaced `60s / target_rpm` apart, shared by all workers.
///
/// Slot `k` is due at `start + k * interval`. A caller that arrives late gets the oldest
/// unclaimed slot immediately, so lateness is caught up instead of accumulating. At most
/// `max_backlog` overdue slots are kept; older ones are skipped.
#[derive(Debug)]
pub struct RateController {
    interval: Duration,
    max_backlog: u64,
    state: Mutex<SlotState>,
    skipped: AtomicU64,
}

impl RateController {
    pub fn new(target_rpm: u32, max_workers: usize) -> Self {
        Self {
            interval: Duration::from_secs(60) / target_rpm.max(1),
            max_backlog: (max_workers as u64).max(1),
            state: Mutex::new(SlotState {
                start: None,
                next: 0,
            }),
            skipped: AtomicU64::new(0),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Anchor the schedule. Without it, the first `next_slot` call anchors it.
    pub fn start_at(&self, started: Instant) {
        let mut state = self.lock();
        if state.start.is_none() {
            state.start = Some(started);
        }
    }

    pub fn skipped_slots(&self) -> u64 {
        self.skipped.load(Ordering::Relaxed)
    }

    /// Wait until the caller's slot is due. Never fails.
    pub async fn next_slot(&self) {
        let due = self.reserve(Instant::now());
        tokio::time::sleep_until(due).await;
    }

    fn reserve(&self, now: Instant) -> Instant {
        let mut state = self.lock();
        let start = *state.start.get_or_insert(now);

        let elapsed = now.saturating_duration_since(start);
        let latest_due = (elapsed.as_nanos() / self.interval.as_nanos().max(1)) as u64;

        let backlog = (latest_due + 1).saturating_sub(state.next);
        if backlog > self.max_backlog {
            let skip = backlog - self.max_backlog;
            state.next += skip;
            self.skipped.fetch_add(skip, Ordering::Relaxed);
        }

        let slot = state.next;
        state.next += 1;

        start + self.offset(slot)
    }

    fn offset(&self, slot: u64) -> Duration {
        let nanos = self.interval.as_nanos().saturating_mul(u128::from(slot));
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SlotState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_evenly_spaced_from_the_anchor() {
        let rate = RateController::new(60, 4);
        let t0 = Instant::now();
        rate.start_at(t0);

        assert_eq!(rate.reserve(t0), t0);
        assert_eq!(rate.reserve(t0), t0 + Duration::from_secs(1));
        assert_eq!(rate.reserve(t0), t0 + Duration::from_secs(2));
        assert_eq!(rate.skipped_slots(), 0);
    }

    #[test]
    fn late_callers_catch_up_within_the_backlog() {
        let rate = RateController::new(60, 2);
        let t0 = Instant::now();
        rate.start_at(t0);

        // Five slots are overdue at t0+4s; only the newest two survive.
        let now = t0 + Duration::from_secs(4);
        assert_eq!(rate.reserve(now), t0 + Duration::from_secs(3));
        assert_eq!(rate.reserve(now), t0 + Duration::from_secs(4));
        assert_eq!(rate.reserve(now), t0 + Duration::from_secs(5));
        assert_eq!(rate.skipped_slots(), 3);
    }

    #[test]
    fn first_call_anchors_the_schedule() {
        let rate = RateController::new(120, 1);
        let t0 = Instant::now();
        assert_eq!(rate.reserve(t0), t0);
        assert_eq!(rate.interval(), Duration::from_millis(500));
        assert_eq!(rate.reserve(t0), t0 + Duration::from_millis(500));
    }
}
