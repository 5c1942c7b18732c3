//! Eviction policies.
//!
//! [`arc`] is the adaptive cache this crate is built around. The others
//! ([`lru`], [`lru_k`], [`lfu`], [`clock`]) share its data structures and its
//! [`CachePolicy`](crate::traits::CachePolicy) contract, and [`sharded`]
//! spreads any of them over independently locked shards.

pub mod arc;
pub mod clock;
pub mod lfu;
pub mod lru;
pub mod lru_k;
pub mod sharded;
