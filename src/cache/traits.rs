//! Core traits for the query cache.

use sha2::{Digest, Sha256};
use std::time::Duration;

/// Identifies one cached query result.
///
/// Two keys that are structurally equal must produce the same
/// `canonical()` string, and therefore land on the same cache entry.
pub trait QueryKey {
  /// Grouping used for bulk invalidation (e.g. "residents")
  fn namespace(&self) -> &'static str;

  /// Deterministic serialization of the key's parameters
  fn canonical(&self) -> String;

  /// Human-readable description for logs and the status line
  fn description(&self) -> String;

  /// Stable, fixed-length entry id
  fn cache_hash(&self) -> String {
    let mut hasher = Sha256::new();
    hasher.update(self.namespace().as_bytes());
    hasher.update(b":");
    hasher.update(self.canonical().as_bytes());
    hex::encode(hasher.finalize())
  }
}

/// Errors that may succeed when the same request is repeated.
pub trait Retryable {
  fn is_retryable(&self) -> bool;
}

impl Retryable for crate::api::ApiError {
  fn is_retryable(&self) -> bool {
    crate::api::ApiError::is_retryable(self)
  }
}

/// Exponential back-off for failed fetches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Attempts after the first one
  pub retries: u32,
  pub base_delay: Duration,
  pub max_delay: Duration,
}

impl RetryPolicy {
  pub fn new(retries: u32) -> Self {
    Self {
      retries,
      base_delay: Duration::from_secs(1),
      max_delay: Duration::from_secs(30),
    }
  }

  pub fn none() -> Self {
    Self::new(0)
  }

  /// Delay before retry number `attempt` (0-based): 1s, 2s, 4s, ... capped
  pub fn delay(&self, attempt: u32) -> Duration {
    let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
    self
      .base_delay
      .checked_mul(factor)
      .map(|d| d.min(self.max_delay))
      .unwrap_or(self.max_delay)
  }
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self::new(3)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  struct Key(&'static str, &'static str);

  impl QueryKey for Key {
    fn namespace(&self) -> &'static str {
      self.0
    }
    fn canonical(&self) -> String {
      self.1.to_string()
    }
    fn description(&self) -> String {
      format!("{} {}", self.0, self.1)
    }
  }

  #[test]
  fn test_hash_depends_on_namespace_and_params() {
    let a = Key("residents", "page=1");
    assert_eq!(a.cache_hash(), Key("residents", "page=1").cache_hash());
    assert_ne!(a.cache_hash(), Key("residents", "page=2").cache_hash());
    assert_ne!(a.cache_hash(), Key("users", "page=1").cache_hash());
    assert_eq!(a.cache_hash().len(), 64);
  }

  #[test]
  fn test_backoff_doubles_and_caps() {
    let policy = RetryPolicy::default();
    assert_eq!(policy.delay(0), Duration::from_secs(1));
    assert_eq!(policy.delay(1), Duration::from_secs(2));
    assert_eq!(policy.delay(2), Duration::from_secs(4));
    assert_eq!(policy.delay(5), Duration::from_secs(30));
    assert_eq!(policy.delay(40), Duration::from_secs(30));
  }
}
