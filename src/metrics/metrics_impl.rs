use crate::metrics::cell::MetricsCell;
use crate::metrics::snapshot::ArcMetricsSnapshot;
use crate::metrics::traits::{ArcMetricsRecorder, CoreMetricsRecorder, MetricsReset};

// ---------------------------------------------------------------------------
// ArcMetrics
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ArcMetrics {
    pub get_calls: MetricsCell,
    pub get_hits: MetricsCell,
    pub get_misses: MetricsCell,
    pub put_calls: MetricsCell,
    pub recency_ghost_hits: MetricsCell,
    pub frequency_ghost_hits: MetricsCell,
    pub recency_gains: MetricsCell,
    pub frequency_gains: MetricsCell,
    pub refused_transfers: MetricsCell,
    pub promotions: MetricsCell,
}

impl ArcMetrics {
    /// Copies the counters; partition capacities are filled in by the cache.
    pub fn snapshot_with(
        &self,
        recency_capacity: usize,
        frequency_capacity: usize,
    ) -> ArcMetricsSnapshot {
        ArcMetricsSnapshot {
            get_calls: self.get_calls.get(),
            get_hits: self.get_hits.get(),
            get_misses: self.get_misses.get(),
            put_calls: self.put_calls.get(),
            recency_ghost_hits: self.recency_ghost_hits.get(),
            frequency_ghost_hits: self.frequency_ghost_hits.get(),
            recency_gains: self.recency_gains.get(),
            frequency_gains: self.frequency_gains.get(),
            refused_transfers: self.refused_transfers.get(),
            promotions: self.promotions.get(),
            recency_capacity,
            frequency_capacity,
        }
    }
}

impl CoreMetricsRecorder for ArcMetrics {
    fn record_get_hit(&self) {
        self.get_calls.incr();
        self.get_hits.incr();
    }
    fn record_get_miss(&self) {
        self.get_calls.incr();
        self.get_misses.incr();
    }
    fn record_put(&self) {
        self.put_calls.incr();
    }
}

impl ArcMetricsRecorder for ArcMetrics {
    fn record_recency_ghost_hit(&self) {
        self.recency_ghost_hits.incr();
    }
    fn record_frequency_ghost_hit(&self) {
        self.frequency_ghost_hits.incr();
    }
    fn record_recency_gain(&self) {
        self.recency_gains.incr();
    }
    fn record_frequency_gain(&self) {
        self.frequency_gains.incr();
    }
    fn record_refused_transfer(&self) {
        self.refused_transfers.incr();
    }
    fn record_promotion(&self) {
        self.promotions.incr();
    }
}

impl MetricsReset for ArcMetrics {
    fn reset_metrics(&self) {
        for cell in [
            &self.get_calls,
            &self.get_hits,
            &self.get_misses,
            &self.put_calls,
            &self.recency_ghost_hits,
            &self.frequency_ghost_hits,
            &self.recency_gains,
            &self.frequency_gains,
            &self.refused_transfers,
            &self.promotions,
        ] {
            cell.reset();
        }
    }
}
