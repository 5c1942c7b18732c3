/// Point-in-time copy of [`ArcMetrics`](crate::metrics::metrics_impl::ArcMetrics).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArcMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub put_calls: u64,

    pub recency_ghost_hits: u64,
    pub frequency_ghost_hits: u64,
    pub recency_gains: u64,
    pub frequency_gains: u64,
    pub refused_transfers: u64,
    pub promotions: u64,

    pub recency_capacity: usize,
    pub frequency_capacity: usize,
}

impl ArcMetricsSnapshot {
    /// Fraction of `get` calls that hit, `0.0` before the first call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
