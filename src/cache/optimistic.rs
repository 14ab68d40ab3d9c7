//! Snapshot → apply → commit-or-rollback around a mutation.
//!
//! [`begin`] stops in-flight fetches for the key, remembers the cached value
//! and writes the speculative one. The returned [`Snapshot`] is then either
//! committed (server accepted) or rolled back (server refused). Both paths
//! invalidate the key's namespace so the next read re-fetches from the server.

use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::store::QueryCache;
use super::traits::QueryKey;

/// Cached value as it was before an optimistic write.
#[derive(Debug, Clone)]
#[must_use = "a snapshot must be committed or rolled back"]
pub struct Snapshot<K, T> {
  key: K,
  previous: Option<T>,
}

impl<K: QueryKey, T: Serialize> Snapshot<K, T> {
  pub fn key(&self) -> &K {
    &self.key
  }

  pub fn previous(&self) -> Option<&T> {
    self.previous.as_ref()
  }

  /// The server accepted the change: mark the namespace stale.
  pub fn commit(self, cache: &QueryCache) {
    debug!(key = %self.key.description(), "optimistic change committed");
    cache.invalidate(self.key.namespace());
  }

  /// The server refused the change: put back exactly what was cached.
  pub fn rollback(self, cache: &QueryCache) {
    debug!(key = %self.key.description(), "rolling back optimistic change");
    match &self.previous {
      Some(value) => cache.set(&self.key, value),
      None => cache.remove(&self.key),
    }
    cache.invalidate(self.key.namespace());
  }
}

/// Cancel fetches for `key`, snapshot its value, and write `apply(previous)`.
///
/// When `apply` returns `None` the cache is left as it was.
pub fn begin<K, T, F>(cache: &QueryCache, key: &K, apply: F) -> Snapshot<K, T>
where
  K: QueryKey + Clone,
  T: Serialize + DeserializeOwned + Clone,
  F: FnOnce(Option<T>) -> Option<T>,
{
  cache.cancel_in_flight(key);
  let previous: Option<T> = cache.get(key);
  if let Some(next) = apply(previous.clone()) {
    cache.set(key, &next);
  }
  Snapshot {
    key: key.clone(),
    previous,
  }
}

/// Run `request` under an optimistic write, committing or rolling back on its outcome.
pub async fn run_optimistic<K, T, F, Fut, R, E>(
  cache: &QueryCache,
  key: &K,
  apply: F,
  request: Fut,
) -> Result<R, E>
where
  K: QueryKey + Clone,
  T: Serialize + DeserializeOwned + Clone,
  F: FnOnce(Option<T>) -> Option<T>,
  Fut: Future<Output = Result<R, E>>,
{
  let snapshot = begin(cache, key, apply);
  match request.await {
    Ok(result) => {
      snapshot.commit(cache);
      Ok(result)
    }
    Err(e) => {
      snapshot.rollback(cache);
      Err(e)
    }
  }
}

/// A mutation whose request runs on the runtime while the UI keeps going.
///
/// The optimistic value is written when it starts; `poll()` settles the
/// snapshot on the UI loop once the request finishes. Dropping it unsettled
/// rolls the snapshot back, so the next read re-fetches what the server has.
pub struct PendingMutation<K: QueryKey, T: Serialize, R, E> {
  label: String,
  cache: QueryCache,
  snapshot: Option<Snapshot<K, T>>,
  receiver: oneshot::Receiver<Result<R, E>>,
}

impl<K, T, R, E> PendingMutation<K, T, R, E>
where
  K: QueryKey + Clone,
  T: Serialize + DeserializeOwned + Clone,
  R: Send + 'static,
  E: Send + 'static,
{
  pub fn start<F, Fut>(
    cache: &QueryCache,
    key: &K,
    label: impl Into<String>,
    apply: F,
    request: Fut,
  ) -> Self
  where
    F: FnOnce(Option<T>) -> Option<T>,
    Fut: Future<Output = Result<R, E>> + Send + 'static,
  {
    let snapshot = begin(cache, key, apply);
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(request.await);
    });
    Self {
      label: label.into(),
      cache: cache.clone(),
      snapshot: Some(snapshot),
      receiver: rx,
    }
  }

  pub fn label(&self) -> &str {
    &self.label
  }

  /// Settle the mutation if its request has finished.
  ///
  /// Returns `None` while the request is still running. A request that
  /// vanished without answering is rolled back and reported as `Some(None)`.
  pub fn poll(&mut self) -> Option<Option<Result<R, E>>> {
    let outcome = match self.receiver.try_recv() {
      Ok(result) => Some(result),
      Err(oneshot::error::TryRecvError::Empty) => return None,
      Err(oneshot::error::TryRecvError::Closed) => None,
    };

    if let Some(snapshot) = self.snapshot.take() {
      match &outcome {
        Some(Ok(_)) => snapshot.commit(&self.cache),
        _ => snapshot.rollback(&self.cache),
      }
    }
    Some(outcome)
  }
}

impl<K: QueryKey, T: Serialize, R, E> Drop for PendingMutation<K, T, R, E> {
  fn drop(&mut self) {
    if let Some(snapshot) = self.snapshot.take() {
      warn!(mutation = %self.label, "mutation dropped before it settled");
      snapshot.rollback(&self.cache);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::store::tests::TestKey;
  use std::time::Duration;

  fn cache_with(key: &TestKey, value: Vec<u32>) -> QueryCache {
    let cache = QueryCache::new(Duration::from_secs(60));
    cache.set(key, &value);
    cache
  }

  fn push(n: u32) -> impl FnOnce(Option<Vec<u32>>) -> Option<Vec<u32>> {
    move |prev| {
      let mut items = prev.unwrap_or_default();
      items.insert(0, n);
      Some(items)
    }
  }

  #[test]
  fn test_begin_applies_and_rollback_restores() {
    let key = TestKey::new("residents", 1);
    let cache = cache_with(&key, vec![1, 2]);

    let snapshot = begin(&cache, &key, push(9));
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![9, 1, 2]));
    assert_eq!(snapshot.previous(), Some(&vec![1, 2]));

    snapshot.rollback(&cache);
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![1, 2]));
    assert!(cache.is_invalidated(&key));
  }

  #[test]
  fn test_rollback_of_absent_entry_removes_it() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let key = TestKey::new("residents", 1);

    let snapshot = begin(&cache, &key, push(9));
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![9]));

    snapshot.rollback(&cache);
    assert_eq!(cache.get::<Vec<u32>>(&key), None);
  }

  #[test]
  fn test_commit_keeps_value_and_invalidates_namespace() {
    let key = TestKey::new("residents", 1);
    let cache = cache_with(&key, vec![1]);
    let sibling = TestKey::new("residents", 2);
    let other = TestKey::new("users", 1);
    cache.set(&sibling, &vec![5u32]);
    cache.set(&other, &vec![6u32]);

    begin(&cache, &key, push(2)).commit(&cache);
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![2, 1]));
    assert!(cache.is_invalidated(&key));
    assert!(cache.is_invalidated(&sibling));
    assert!(!cache.is_invalidated(&other));
  }

  #[test]
  fn test_begin_cancels_running_fetch() {
    let key = TestKey::new("residents", 1);
    let cache = cache_with(&key, vec![1]);
    let ticket = cache.begin_fetch(&key);

    let _snapshot = begin(&cache, &key, push(2));
    assert!(!cache.complete_fetch(&key, &ticket, &vec![0u32]));
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![2, 1]));
  }

  #[tokio::test]
  async fn test_run_optimistic_outcomes() {
    let key = TestKey::new("residents", 1);
    let cache = cache_with(&key, vec![1]);

    let ok: Result<&str, String> =
      run_optimistic(&cache, &key, push(2), async { Ok("saved") }).await;
    assert_eq!(ok, Ok("saved"));
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![2, 1]));

    let err: Result<(), String> =
      run_optimistic(&cache, &key, push(3), async { Err("rejected".to_string()) }).await;
    assert_eq!(err, Err("rejected".to_string()));
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![2, 1]));
  }

  #[tokio::test]
  async fn test_pending_mutation_settles_on_poll() {
    let key = TestKey::new("residents", 1);
    let cache = cache_with(&key, vec![1]);

    let mut pending: PendingMutation<TestKey, Vec<u32>, (), String> =
      PendingMutation::start(&cache, &key, "Adding", push(7), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err("server said no".to_string())
      });
    assert_eq!(pending.label(), "Adding");
    assert!(pending.poll().is_none());
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![7, 1]));

    let outcome = loop {
      if let Some(outcome) = pending.poll() {
        break outcome;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    };
    assert_eq!(outcome, Some(Err("server said no".to_string())));
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![1]));
  }

  #[tokio::test]
  async fn test_dropped_mutation_rolls_back() {
    let key = TestKey::new("residents", 1);
    let cache = cache_with(&key, vec![1, 2]);

    let pending: PendingMutation<TestKey, Vec<u32>, (), String> =
      PendingMutation::start(&cache, &key, "Archiving", |_| Some(vec![1]), async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err("server said no".to_string())
      });
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![1]));

    drop(pending);
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![1, 2]));
    assert!(cache.is_invalidated(&key));

    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![1, 2]));
  }

  #[tokio::test]
  async fn test_settled_mutation_drop_is_silent() {
    let key = TestKey::new("residents", 1);
    let cache = cache_with(&key, vec![1]);

    let mut pending: PendingMutation<TestKey, Vec<u32>, (), String> =
      PendingMutation::start(&cache, &key, "Adding", push(2), async { Ok(()) });
    let outcome = loop {
      if let Some(outcome) = pending.poll() {
        break outcome;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    };
    assert_eq!(outcome, Some(Ok(())));
    drop(pending);
    assert_eq!(cache.get::<Vec<u32>>(&key), Some(vec![2, 1]));
  }
}
