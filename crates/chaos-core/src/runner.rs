//! Run loop
//!
//! Warm-up, then dispatch iterations with jittered pacing until the
//! [`StopSignal`] fires or the optional request budget runs out. The stop
//! flag is checked at every iteration boundary and interrupts the pacing
//! sleep; an in-flight request is always allowed to finish.

use crate::config::ChaosConfig;
use crate::operation::OperationKind;
use crate::scheduler::ChaosScheduler;
use crate::state_machine::{validate_transition, RunState};
use crate::stats::RunStats;
use crate::transport::Transport;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Cooperative stop flag shared between a signal task and the run loop
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopSignal {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop; idempotent
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    #[inline]
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolve once a stop has been requested
    pub async fn triggered(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_triggered() {
                return;
            }
            notified.await;
        }
    }
}

/// Uniform jitter between iterations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    min: Duration,
    max: Duration,
}

impl Pacing {
    /// Pacing within `[min, max]`; bounds are swapped if inverted
    #[must_use]
    pub fn new(min: Duration, max: Duration) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    /// No delay at all
    #[must_use]
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Whether the progress line is due after `count` iterations
#[inline]
#[must_use]
pub fn should_report(count: u64, every: u64) -> bool {
    every > 0 && count > 0 && count % every == 0
}

/// Why the loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// External interruption
    Interrupted,
    /// `max_requests` iterations completed
    BudgetExhausted,
}

/// Summary of a finished run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub seed: u64,
    pub final_state: RunState,
    pub stop_reason: StopReason,
    pub warmup_created: u32,
    pub tracked_entities: usize,
    pub elapsed: Duration,
    pub stats: RunStats,
}

impl RunReport {
    /// Generate text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Chaos Run Report ===\n\n");
        report.push_str(&format!("Seed: {}\n", self.seed));
        report.push_str(&format!("Stop Reason: {:?}\n", self.stop_reason));
        report.push_str(&format!("Elapsed: {:.1}s\n", self.elapsed.as_secs_f64()));
        report.push_str(&format!("Warm-up Creates: {}\n", self.warmup_created));
        report.push_str(&format!("Iterations: {}\n", self.stats.iterations));
        report.push_str(&format!("Requests Sent: {}\n", self.stats.requests_sent()));
        report.push_str(&format!(
            "Valid / Error Selections: {} / {} ({:.1}% error)\n",
            self.stats.valid_selected,
            self.stats.error_selected,
            self.stats.error_share() * 100.0
        ));
        report.push_str(&format!("Transport Failures: {}\n", self.stats.transport_failures()));
        report.push_str(&format!("Tracked Entities: {}\n", self.tracked_entities));

        report.push_str("\n=== Operations ===\n");
        report.push_str(&format!(
            "{:<18} {:>6} {:>6} {:>6} {:>6} {:>6}\n",
            "operation", "ok", "rej", "bad", "io", "skip"
        ));
        let refresh = &self.stats.refreshes;
        report.push_str(&format!(
            "{:<18} {:>6} {:>6} {:>6} {:>6} {:>6}\n",
            "(refresh)",
            refresh.succeeded,
            refresh.rejected,
            refresh.malformed,
            refresh.transport_failed,
            refresh.skipped
        ));
        for (kind, tally) in &self.stats.per_operation {
            report.push_str(&format!(
                "{:<18} {:>6} {:>6} {:>6} {:>6} {:>6}\n",
                kind.name(),
                tally.succeeded,
                tally.rejected,
                tally.malformed,
                tally.transport_failed,
                tally.skipped
            ));
        }

        report
    }
}

/// Drives a [`ChaosScheduler`] until stopped
#[derive(Debug)]
pub struct ChaosRunner<T> {
    scheduler: ChaosScheduler<T>,
    pacing: Pacing,
    pacing_rng: StdRng,
    seed: u64,
    warmup_creates: u32,
    report_every: u64,
    max_requests: Option<u64>,
    state: RunState,
}

impl<T: Transport> ChaosRunner<T> {
    /// Runner with defaults taken from [`ChaosConfig::default`]
    #[must_use]
    pub fn new(scheduler: ChaosScheduler<T>, seed: u64) -> Self {
        let defaults = ChaosConfig::default();
        Self {
            scheduler,
            pacing: Pacing::new(defaults.min_delay(), defaults.max_delay()),
            pacing_rng: StdRng::seed_from_u64(seed.wrapping_add(1)),
            seed,
            warmup_creates: defaults.warmup_creates,
            report_every: defaults.report_every,
            max_requests: defaults.max_requests,
            state: RunState::Running,
        }
    }

    /// Runner fully described by a validated configuration
    ///
    /// Draws a seed from entropy when the config has none.
    #[must_use]
    pub fn from_config(transport: T, config: &ChaosConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let scheduler = ChaosScheduler::from_config(transport, config, seed);
        Self::new(scheduler, seed)
            .with_pacing(Pacing::new(config.min_delay(), config.max_delay()))
            .with_warmup_creates(config.warmup_creates)
            .with_report_every(config.report_every)
            .with_max_requests(config.max_requests)
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_warmup_creates(mut self, count: u32) -> Self {
        self.warmup_creates = count;
        self
    }

    #[must_use]
    pub fn with_report_every(mut self, every: u64) -> Self {
        self.report_every = every.max(1);
        self
    }

    #[must_use]
    pub fn with_max_requests(mut self, max: Option<u64>) -> Self {
        self.max_requests = max;
        self
    }

    #[inline]
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn scheduler(&self) -> &ChaosScheduler<T> {
        &self.scheduler
    }

    /// Run until `stop` fires or the budget is spent
    pub async fn run(mut self, stop: StopSignal) -> RunReport {
        let started = Instant::now();
        tracing::info!(
            endpoint = %self.scheduler.endpoint().collection_path(),
            seed = self.seed,
            "Starting chaos client"
        );

        let mut warmup_created = 0;
        for _ in 0..self.warmup_creates {
            if stop.is_triggered() {
                break;
            }
            if self.scheduler.execute(OperationKind::CreateValid).await.is_success() {
                warmup_created += 1;
            }
        }

        let mut request_count: u64 = 0;
        let stop_reason = loop {
            if stop.is_triggered() {
                break StopReason::Interrupted;
            }
            if self.max_requests.is_some_and(|max| request_count >= max) {
                break StopReason::BudgetExhausted;
            }
            self.advance(RunState::Running);

            self.scheduler.tick().await;
            request_count += 1;

            if should_report(request_count, self.report_every) {
                tracing::info!(
                    requests = request_count,
                    tracked = self.scheduler.registry().len(),
                    "Sent {} requests so far; tracking {} entities",
                    request_count,
                    self.scheduler.registry().len()
                );
            }

            if self.max_requests.is_some_and(|max| request_count >= max) {
                continue;
            }
            let delay = self.pacing.next_delay(&mut self.pacing_rng);
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = stop.triggered() => {}
            }
        };

        self.advance(RunState::Stopped);
        match stop_reason {
            StopReason::Interrupted => tracing::info!("Chaos client stopped by interrupt. Exiting."),
            StopReason::BudgetExhausted => {
                tracing::info!(requests = request_count, "Request budget exhausted. Exiting.");
            }
        }

        RunReport {
            seed: self.seed,
            final_state: self.state,
            stop_reason,
            warmup_created,
            tracked_entities: self.scheduler.registry().len(),
            elapsed: started.elapsed(),
            stats: self.scheduler.stats().clone(),
        }
    }

    fn advance(&mut self, to: RunState) {
        if let Err(e) = validate_transition(self.state, to) {
            tracing::error!(error = %e, "Ignoring run state transition");
            return;
        }
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_line_every_twenty() {
        assert!(!should_report(19, 20));
        assert!(should_report(20, 20));
        assert!(!should_report(21, 20));
        assert!(should_report(40, 20));
        assert!(!should_report(0, 20));
        assert!(!should_report(5, 0));
    }

    #[test]
    fn pacing_stays_within_bounds() {
        let pacing = Pacing::new(Duration::from_millis(500), Duration::from_millis(2000));
        let mut rng = StdRng::seed_from_u64(9);
        let delays: Vec<_> = (0..1000).map(|_| pacing.next_delay(&mut rng)).collect();

        assert!(delays
            .iter()
            .all(|d| (Duration::from_millis(500)..=Duration::from_millis(2000)).contains(d)));
        assert!(delays.iter().any(|d| *d < Duration::from_millis(1000)));
        assert!(delays.iter().any(|d| *d > Duration::from_millis(1500)));
    }

    #[test]
    fn pacing_swaps_inverted_bounds() {
        let pacing = Pacing::new(Duration::from_millis(30), Duration::from_millis(10));
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let d = pacing.next_delay(&mut rng);
            assert!((Duration::from_millis(10)..=Duration::from_millis(30)).contains(&d));
        }
        assert_eq!(Pacing::none().next_delay(&mut rng), Duration::ZERO);
    }

    #[test]
    fn stop_signal_is_shared_between_clones() {
        let stop = StopSignal::new();
        let other = stop.clone();
        assert!(!other.is_triggered());
        stop.trigger();
        assert!(other.is_triggered());
    }
}
