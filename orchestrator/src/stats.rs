// orchestrator/src/stats.rs

use gate_core::{DecisionMethod, StatsSnapshot};
use std::time::Duration;

/// Process-lifetime counters, owned by the orchestrator.
#[derive(Debug, Default, Clone)]
pub struct DecisionStats {
    total_requests: u64,
    memory_used: u64,
    memory_skipped: u64,
    cache_hits: u64,
    /// Running mean, in milliseconds.
    average_decision_time: f64,
}

impl DecisionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// The single mutation point, called once per finished request.
    pub fn record(&mut self, method: DecisionMethod, needs_memory: bool, elapsed: Duration) {
        self.total_requests += 1;
        if needs_memory {
            self.memory_used += 1;
        } else {
            self.memory_skipped += 1;
        }
        if method == DecisionMethod::Cached {
            self.cache_hits += 1;
        }

        let elapsed_ms = elapsed.as_secs_f64() * 1_000.0;
        self.average_decision_time += (elapsed_ms - self.average_decision_time) / self.total_requests as f64;
    }

    pub fn snapshot(&self, cache_size: usize) -> StatsSnapshot {
        StatsSnapshot {
            total_requests: self.total_requests,
            memory_used: self.memory_used,
            memory_skipped: self.memory_skipped,
            cache_hits: self.cache_hits,
            average_decision_time: self.average_decision_time,
            cache_size,
            cache_hit_rate: percent(self.cache_hits, self.total_requests),
            memory_usage_rate: percent(self.memory_used, self.total_requests),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn percent(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 * 100.0 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_zero_rates() {
        let snapshot = DecisionStats::new().snapshot(0);
        assert_eq!(snapshot, StatsSnapshot::default());
    }

    #[test]
    fn incremental_mean_matches_plain_mean() {
        let mut stats = DecisionStats::new();
        for ms in [10, 20, 60] {
            stats.record(DecisionMethod::RuleBased, false, Duration::from_millis(ms));
        }
        let snapshot = stats.snapshot(0);
        assert!((snapshot.average_decision_time - 30.0).abs() < 1e-9);
    }

    #[test]
    fn counts_and_rates() {
        let mut stats = DecisionStats::new();
        stats.record(DecisionMethod::RuleBased, true, Duration::ZERO);
        stats.record(DecisionMethod::Cached, true, Duration::ZERO);
        stats.record(DecisionMethod::Llm, false, Duration::ZERO);
        stats.record(DecisionMethod::Fallback, false, Duration::ZERO);

        let snapshot = stats.snapshot(3);
        assert_eq!(snapshot.total_requests, 4);
        assert_eq!(snapshot.memory_used, 2);
        assert_eq!(snapshot.memory_skipped, 2);
        assert_eq!(snapshot.cache_hits, 1);
        assert_eq!(snapshot.cache_size, 3);
        assert_eq!(snapshot.cache_hit_rate, 25.0);
        assert_eq!(snapshot.memory_usage_rate, 50.0);

        stats.reset();
        assert_eq!(stats.snapshot(0).total_requests, 0);
    }
}
