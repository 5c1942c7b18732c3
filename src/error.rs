//! Error types for the adaptive-cache library.
//!
//! Ordinary cache outcomes (misses, evictions, refused capacity transfers)
//! are plain return values. Only two things are errors:
//!
//! - [`ConfigError`]: a construction parameter is out of range
//!   (promotion threshold 0, shard count 0, LRU-K `k` 0, LFU aging limit 0).
//! - [`InvariantError`]: `check_invariants` found internal state that
//!   disagrees with itself.
//!
//! ## Example Usage
//!
//! ```
//! use adaptive_cache::error::ConfigError;
//! use adaptive_cache::policy::arc::ArcCache;
//!
//! let cache: Result<ArcCache<String, i32>, ConfigError> = ArcCache::try_with_threshold(100, 3);
//! assert!(cache.is_ok());
//!
//! let bad = ArcCache::<String, i32>::try_with_threshold(100, 0);
//! assert!(bad.unwrap_err().to_string().contains("promotion_threshold"));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Produced by `check_invariants` methods such as
/// [`ArcCache::check_invariants`](crate::policy::arc::ArcCache::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Prefixes the message with the structure that failed.
    pub fn context(self, scope: &str) -> Self {
        Self(format!("{scope}: {}", self.0))
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl From<String> for InvariantError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`ArcCache::try_with_threshold`](crate::policy::arc::ArcCache::try_with_threshold)
/// and [`CacheBuilder::try_build`](crate::builder::CacheBuilder::try_build).
/// Infallible constructors clamp the same parameters instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Error for a parameter that must be at least 1.
    pub fn must_be_positive(param: &str) -> Self {
        Self(format!("{param} must be > 0"))
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- InvariantError ---------------------------------------------------

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("ghost list over capacity");
        assert_eq!(err.to_string(), "ghost list over capacity");
    }

    #[test]
    fn invariant_context_prefixes_scope() {
        let err = InvariantError::new("bucket 3 tail is stale").context("frequency partition");
        assert_eq!(err.message(), "frequency partition: bucket 3 tail is stale");
    }

    #[test]
    fn invariant_from_string() {
        let err: InvariantError = String::from("broken link").into();
        assert_eq!(err, InvariantError::new("broken link"));
    }

    #[test]
    fn invariant_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<InvariantError>();
    }

    // -- ConfigError ------------------------------------------------------

    #[test]
    fn config_must_be_positive_names_param() {
        let err = ConfigError::must_be_positive("shards");
        assert_eq!(err.to_string(), "shards must be > 0");
    }

    #[test]
    fn config_debug_includes_message() {
        let err = ConfigError::new("bad threshold");
        let dbg = format!("{:?}", err);
        assert!(dbg.contains("bad threshold"));
    }

    #[test]
    fn config_implements_std_error() {
        fn assert_error<T: std::error::Error>() {}
        assert_error::<ConfigError>();
    }
}
