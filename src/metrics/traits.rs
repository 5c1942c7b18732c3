//! # Metrics Traits
//!
//! Recording, snapshotting and resetting are separate traits so cache code
//! only ever writes counters and callers only ever read them.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │     CoreMetricsRecorder     │   get hit/miss, put
//!   └──────────────┬──────────────┘
//!                  │
//!                  ▼
//!   ┌─────────────────────────────┐
//!   │     ArcMetricsRecorder      │   ghost hits, capacity transfers,
//!   └─────────────────────────────┘   promotions
//!
//!   Consumption:
//!   ┌──────────────────────────────┐    ┌──────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsReset         │
//!   └──────────────────────────────┘    └──────────────────────┘
//! ```
//!
//! Recorders take `&self`: the ARC orchestrator holds no lock of its own, so
//! its counters must be safe to bump from any thread.

/// Common counters for any cache policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&self);
    fn record_get_miss(&self);
    fn record_put(&self);
}

/// Counters for the ARC ghost-hit/rebalance protocol.
pub trait ArcMetricsRecorder: CoreMetricsRecorder {
    fn record_recency_ghost_hit(&self);
    fn record_frequency_ghost_hit(&self);
    /// One unit of capacity moved from the frequency to the recency partition.
    fn record_recency_gain(&self);
    /// One unit of capacity moved from the recency to the frequency partition.
    fn record_frequency_gain(&self);
    /// A ghost hit whose donor partition had no capacity left to give.
    fn record_refused_transfer(&self);
    fn record_promotion(&self);
}

/// Produce a point-in-time copy of the counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or workload phases.
pub trait MetricsReset {
    fn reset_metrics(&self);
}
