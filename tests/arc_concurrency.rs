// ==============================================
// ARC CONCURRENCY TESTS (integration)
// ==============================================
//
// Threads share caches through Arc with no outer lock. Final contents are
// not deterministic; the checks are that every thread finishes and that the
// structures are consistent once they have.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use adaptive_cache::builder::{CacheBuilder, PolicyKind};
use adaptive_cache::policy::arc::{ArcCache, ArcConfig, GhostRead};
use adaptive_cache::policy::lfu::LfuCache;
use adaptive_cache::policy::lru::LruCache;
use adaptive_cache::policy::sharded::HashArcCache;
use adaptive_cache::traits::{CachePolicy, ConcurrentCache};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const THREADS: u64 = 8;
const OPS_PER_THREAD: u64 = 2_000;

/// Runs put/get pairs over an overlapping key range from every thread and
/// returns the number of hits.
fn hammer<C>(cache: Arc<C>, key_space: u64) -> usize
where
    C: CachePolicy<u64, u64> + ConcurrentCache + 'static,
{
    let hits = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..THREADS)
        .map(|thread_id| {
            let cache = Arc::clone(&cache);
            let hits = Arc::clone(&hits);
            thread::spawn(move || {
                let mut rng = SmallRng::seed_from_u64(thread_id);
                for _ in 0..OPS_PER_THREAD {
                    let key = rng.random_range(0..key_space);
                    cache.put(key, key * 2);
                    let probe = rng.random_range(0..key_space);
                    if let Some(value) = cache.get(&probe) {
                        assert_eq!(value, probe * 2);
                        hits.fetch_add(1, Ordering::Relaxed);
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
    hits.load(Ordering::Relaxed)
}

mod arc_cache {
    use super::*;

    #[test]
    fn concurrent_put_get_keeps_invariants() {
        let cache = Arc::new(ArcCache::new(64));
        let hits = hammer(Arc::clone(&cache), 256);

        assert!(hits > 0);
        assert!(cache.check_invariants().is_ok());
        assert_eq!(cache.recency_capacity() + cache.frequency_capacity(), 64);
        assert!(cache.len() <= 64);
    }

    #[test]
    fn concurrent_resurrecting_reads_keep_invariants() {
        let cache = Arc::new(ArcCache::from_config(ArcConfig {
            capacity: 32,
            promotion_threshold: 2,
            ghost_read: GhostRead::Resurrect,
        }));
        hammer(Arc::clone(&cache), 96);

        if let Err(err) = cache.check_invariants() {
            panic!("{err}");
        }
    }

    #[test]
    fn tiny_cache_survives_contention() {
        let cache = Arc::new(ArcCache::new(2));
        hammer(Arc::clone(&cache), 8);
        assert!(cache.check_invariants().is_ok());
        assert!(cache.len() <= 2);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_count_every_call() {
        let cache = Arc::new(ArcCache::new(64));
        hammer(Arc::clone(&cache), 128);

        let snapshot = cache.metrics_snapshot();
        let total = THREADS * OPS_PER_THREAD;
        assert_eq!(snapshot.put_calls, total);
        assert_eq!(snapshot.get_calls, total);
        assert_eq!(snapshot.get_hits + snapshot.get_misses, total);
    }
}

mod siblings {
    use super::*;

    #[test]
    fn lru_and_lfu_stay_consistent() {
        let lru = Arc::new(LruCache::new(64));
        hammer(Arc::clone(&lru), 200);
        assert!(lru.check_invariants().is_ok());

        let lfu = Arc::new(LfuCache::new(64));
        hammer(Arc::clone(&lfu), 200);
        assert!(lfu.check_invariants().is_ok());
    }

    #[test]
    fn sharded_arc_shards_stay_consistent() {
        let cache = Arc::new(HashArcCache::new(128, 8));
        hammer(Arc::clone(&cache), 512);
        for shard in cache.shards() {
            assert!(shard.check_invariants().is_ok());
        }
    }

    #[test]
    fn built_caches_are_shareable() {
        for policy in PolicyKind::ALL {
            let cache = Arc::new(CacheBuilder::new(64).build::<u64, u64>(policy));
            hammer(Arc::clone(&cache), 128);
            assert!(cache.len() <= 64, "{policy:?}");
        }
    }
}
