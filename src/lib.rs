//! adaptive-cache: an Adaptive Replacement Cache and sibling eviction
//! policies behind one thread-safe `put`/`get` contract.
//!
//! ```text
//!   traits        CachePolicy / ConcurrentCache / CacheFactory
//!   policy::arc   ArcCache = RecencyPart + FrequencyPart, capacity moved by ghost hits
//!   policy::*     LruCache, LruKCache, LfuCache, ClockCache, ShardedCache
//!   builder       CacheBuilder → Cache (runtime policy choice)
//!   ds            lists, buckets, ghost lists and rings the policies share
//!   metrics       ArcCache counters (feature "metrics")
//! ```
//!
//! ## Example
//!
//! ```
//! use adaptive_cache::prelude::*;
//!
//! let cache = ArcCache::new(4);
//! cache.put("a", 1);
//! assert_eq!(cache.get(&"a"), Some(1));
//! assert!(cache.check_invariants().is_ok());
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;

pub use crate::builder::{Cache, CacheBuilder, PolicyKind};
pub use crate::error::{ConfigError, InvariantError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::ArcMetricsSnapshot;
pub use crate::policy::arc::{ArcCache, ArcConfig, GhostRead};
pub use crate::policy::clock::ClockCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::lru_k::LruKCache;
pub use crate::policy::sharded::{HashArcCache, HashLfuCache, HashLruCache, ShardedCache};
pub use crate::traits::{CacheFactory, CachePolicy, ConcurrentCache};
