//! Common imports: `use adaptive_cache::prelude::*;`

pub use crate::builder::{Cache, CacheBuilder, PolicyKind};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
pub use crate::policy::arc::{ArcCache, ArcConfig, GhostRead};
pub use crate::policy::clock::ClockCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::lru_k::LruKCache;
pub use crate::policy::sharded::{HashArcCache, HashLfuCache, HashLruCache, ShardedCache};
pub use crate::traits::{CacheFactory, CachePolicy, ConcurrentCache};
