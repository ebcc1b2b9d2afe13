//! # pressure-bench: benchmarks and workload profiling for pressure queues
//!
//! Besides the criterion benches this crate replays seeded producer/consumer
//! traffic against a [`Queue`] and records how full it ran.

#![allow(clippy::cast_precision_loss)] // Fill ratios and time shares are f64
//!
//! ## Benchmarks
//!
//! - **queue**: enqueue/dequeue round trips, saturated overflow per policy,
//!   peek, and a mixed seeded workload
//!
//! ## Running Benchmarks
//!
//! ```bash
//! cargo bench -p pressure-bench
//!
//! # Save baseline for comparison
//! cargo bench -p pressure-bench --bench queue -- --save-baseline main
//! ```

use anyhow::{Context, Result, ensure};
use hdrhistogram::Histogram;
use pressure::{Item, OverflowPolicy, PressureState, Queue, QueueConfig, QueueError, Stats};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Distribution of fill levels sampled after each operation.
#[derive(Debug)]
pub struct FillProfile {
    histogram: Histogram<u64>,
    capacity: u32,
    /// Samples per pressure state, indexed Low, Normal, High, Critical, Fault.
    states: [u64; 5],
}

impl FillProfile {
    pub fn new(capacity: u32) -> Result<Self> {
        let histogram = Histogram::new_with_max(u64::from(capacity.max(2)), 3)
            .context("fill histogram bounds")?;
        Ok(Self {
            histogram,
            capacity,
            states: [0; 5],
        })
    }

    /// Records one fill sample taken while the queue was in `state`.
    pub fn record(&mut self, fill: u32, state: PressureState) {
        self.histogram.saturating_record(u64::from(fill));
        self.states[state_index(state)] += 1;
    }

    pub fn count(&self) -> u64 {
        self.histogram.len()
    }

    /// Fill level at `quantile` (0.0 to 1.0).
    pub fn fill_at(&self, quantile: f64) -> u64 {
        self.histogram.value_at_quantile(quantile)
    }

    pub fn max(&self) -> u64 {
        self.histogram.max()
    }

    pub fn mean(&self) -> f64 {
        self.histogram.mean()
    }

    /// Share of samples taken in `state`, 0.0 when nothing was recorded.
    pub fn time_in(&self, state: PressureState) -> f64 {
        match self.count() {
            0 => 0.0,
            n => self.states[state_index(state)] as f64 / n as f64,
        }
    }

    /// Exports the profile as JSON for CI integration.
    pub fn to_json(&self, label: &str) -> String {
        serde_json::json!({
            "label": label,
            "capacity": self.capacity,
            "samples": self.count(),
            "p50_fill": self.fill_at(0.50),
            "p90_fill": self.fill_at(0.90),
            "p99_fill": self.fill_at(0.99),
            "max_fill": self.max(),
            "mean_fill": self.mean(),
            "time_low": self.time_in(PressureState::Low),
            "time_normal": self.time_in(PressureState::Normal),
            "time_high": self.time_in(PressureState::High),
            "time_critical": self.time_in(PressureState::Critical),
        })
        .to_string()
    }
}

fn state_index(state: PressureState) -> usize {
    match state {
        PressureState::Low => 0,
        PressureState::Normal => 1,
        PressureState::High => 2,
        PressureState::Critical => 3,
        PressureState::Fault => 4,
    }
}

/// One step of generated traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Enqueue { payload: u64, timestamp: u64 },
    Dequeue,
}

/// Seeded producer/consumer mix. The same seed always yields the same ops.
#[derive(Debug)]
pub struct Workload {
    rng: StdRng,
    produce_ratio: f64,
    clock: u64,
}

impl Workload {
    /// `produce_ratio` is the probability that a step enqueues; above 0.5
    /// the producer outruns the consumer and the queue fills up.
    pub fn new(seed: u64, produce_ratio: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            produce_ratio: produce_ratio.clamp(0.0, 1.0),
            clock: 0,
        }
    }

    pub fn next_op(&mut self) -> Op {
        self.clock += self.rng.gen_range(1..=100);
        if self.rng.gen_bool(self.produce_ratio) {
            Op::Enqueue {
                payload: self.rng.gen_range(0..u64::MAX),
                timestamp: self.clock,
            }
        } else {
            Op::Dequeue
        }
    }
}

/// What one replayed workload did to a queue.
#[derive(Debug)]
pub struct RunReport {
    pub profile: FillProfile,
    pub stats: Stats,
    pub empty_dequeues: u64,
}

/// Replays `steps` operations from `workload` against a fresh queue built
/// from `config`, sampling the fill level after every step.
pub fn replay(config: QueueConfig, workload: &mut Workload, steps: usize) -> Result<RunReport> {
    let mut slots = vec![Item::EMPTY; config.capacity as usize];
    let queue = Queue::new(config, slots.as_mut_slice())?;
    let mut profile = FillProfile::new(config.capacity)?;
    let mut empty_dequeues = 0;

    for _ in 0..steps {
        let result = match workload.next_op() {
            Op::Enqueue { payload, timestamp } => queue.enqueue(payload, timestamp).map(|_| ()),
            Op::Dequeue => queue.dequeue().map(|_| ()),
        };
        match result {
            Ok(()) | Err(QueueError::Full) => {}
            Err(QueueError::Empty) => empty_dequeues += 1,
            Err(e) => return Err(e).context("queue faulted during replay"),
        }
        profile.record(queue.len(), queue.pressure_state());
    }

    let stats = queue.stats();
    ensure!(
        stats.is_balanced(queue.len()),
        "ledger out of balance after replay: {stats:?}"
    );
    tracing::debug!(
        policy = %config.policy,
        lost = stats.lost(),
        empty_dequeues,
        "workload replayed"
    );
    Ok(RunReport {
        profile,
        stats,
        empty_dequeues,
    })
}

/// Runs the same seeded workload under every overflow policy.
pub fn compare_policies(
    base: QueueConfig,
    seed: u64,
    produce_ratio: f64,
    steps: usize,
) -> Result<Vec<(OverflowPolicy, RunReport)>> {
    OverflowPolicy::ALL
        .iter()
        .map(|&policy| {
            let mut workload = Workload::new(seed, produce_ratio);
            let report = replay(base.with_policy(policy), &mut workload, steps)?;
            Ok((policy, report))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_profile() {
        let mut profile = FillProfile::new(64).unwrap();
        for fill in 0..=64 {
            profile.record(fill, PressureState::Normal);
        }

        assert_eq!(profile.count(), 65);
        assert_eq!(profile.max(), 64);
        assert!(profile.fill_at(0.5) >= 31 && profile.fill_at(0.5) <= 33);
        assert!((profile.time_in(PressureState::Normal) - 1.0).abs() < f64::EPSILON);
        assert!(profile.time_in(PressureState::Critical).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_profile_time_share() {
        let profile = FillProfile::new(8).unwrap();
        assert_eq!(profile.count(), 0);
        assert!(profile.time_in(PressureState::Low).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_export() {
        let mut profile = FillProfile::new(16).unwrap();
        profile.record(4, PressureState::Low);
        profile.record(12, PressureState::High);

        let json = profile.to_json("burst");
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["label"], "burst");
        assert_eq!(parsed["capacity"], 16);
        assert_eq!(parsed["samples"], 2);
        assert_eq!(parsed["max_fill"], 12);
        assert!((parsed["time_high"].as_f64().unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_workload_is_deterministic() {
        let mut a = Workload::new(7, 0.6);
        let mut b = Workload::new(7, 0.6);
        for _ in 0..1_000 {
            assert_eq!(a.next_op(), b.next_op());
        }
    }

    #[test]
    fn test_producer_only_workload() {
        let mut workload = Workload::new(1, 1.0);
        let mut last = 0;
        for _ in 0..100 {
            match workload.next_op() {
                Op::Enqueue { timestamp, .. } => {
                    assert!(timestamp > last);
                    last = timestamp;
                }
                Op::Dequeue => panic!("ratio 1.0 never consumes"),
            }
        }
    }

    #[test]
    fn test_replay_balances_under_every_policy() {
        let base = QueueConfig::with_capacity(32);
        let reports = compare_policies(base, 42, 0.7, 5_000).unwrap();

        assert_eq!(reports.len(), 3);
        for (policy, report) in &reports {
            assert_eq!(report.profile.count(), 5_000, "{policy}");
            assert!(report.profile.max() <= 32, "{policy}");
            assert!(report.stats.lost() > 0, "{policy} should overflow at a 70% produce ratio");
        }
    }

    #[test]
    fn test_consumer_heavy_replay_stays_low() {
        let config = QueueConfig::with_capacity(64);
        let report = replay(config, &mut Workload::new(3, 0.2), 2_000).unwrap();

        assert!(report.empty_dequeues > 0);
        assert_eq!(report.stats.rejected, 0);
        assert!(report.profile.time_in(PressureState::Low) > 0.9);
    }
}
