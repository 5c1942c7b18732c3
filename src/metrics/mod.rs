//! Operation counters for [`ArcCache`](crate::policy::arc::ArcCache).
//!
//! Counters are relaxed atomics updated outside the partition locks, so a
//! snapshot taken while other threads are working is approximate.

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::ArcMetrics;
pub use snapshot::ArcMetricsSnapshot;
pub use traits::{ArcMetricsRecorder, CoreMetricsRecorder, MetricsReset, MetricsSnapshotProvider};
