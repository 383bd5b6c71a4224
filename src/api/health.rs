//! Shared health state for the /health endpoint.
//! Updated by the scoreboard poller.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Shared poll counters. Updated by the poller, read by API.
#[derive(Default)]
pub struct HealthState {
    /// True while the poll loop is running.
    pub poller_running: AtomicBool,
    /// True while a fetch is in flight.
    pub poll_in_flight: AtomicBool,
    /// Nanosecond timestamp of the last successful poll (0 = none).
    pub last_success_at_ns: AtomicU64,
    pub polls_total: AtomicU64,
    pub polls_failed: AtomicU64,
    /// Failed polls since the last success.
    pub consecutive_failures: AtomicU64,
}

impl HealthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_poller_running(&self, v: bool) {
        self.poller_running.store(v, Ordering::Relaxed);
    }

    pub fn set_poll_in_flight(&self, v: bool) {
        self.poll_in_flight.store(v, Ordering::Relaxed);
    }

    pub fn record_success(&self, at_ns: u64) {
        self.polls_total.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.store(0, Ordering::Relaxed);
        self.last_success_at_ns.store(at_ns, Ordering::Relaxed);
    }

    /// Returns the new consecutive failure count.
    pub fn record_failure(&self) -> u64 {
        self.polls_total.fetch_add(1, Ordering::Relaxed);
        self.polls_failed.fetch_add(1, Ordering::Relaxed);
        self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn poller_running(&self) -> bool {
        self.poller_running.load(Ordering::Relaxed)
    }

    pub fn poll_in_flight(&self) -> bool {
        self.poll_in_flight.load(Ordering::Relaxed)
    }

    pub fn last_success_at_ns(&self) -> u64 {
        self.last_success_at_ns.load(Ordering::Relaxed)
    }

    pub fn polls_total(&self) -> u64 {
        self.polls_total.load(Ordering::Relaxed)
    }

    pub fn polls_failed(&self) -> u64 {
        self.polls_failed.load(Ordering::Relaxed)
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }
}
