use std::sync::atomic::{AtomicU64, Ordering};

/// A metrics-only counter.
///
/// Counters are observational: they never feed back into eviction or
/// rebalancing decisions, so relaxed ordering is enough. Recording through
/// `&self` lets callers that hold no lock (the ARC orchestrator) count events.
#[repr(transparent)]
#[derive(Debug, Default)]
pub struct MetricsCell(AtomicU64);

impl MetricsCell {
    #[inline]
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    #[inline]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn incr(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}
