//! In-memory query cache shared by observers and mutations.

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use super::traits::QueryKey;

struct Entry {
  namespace: &'static str,
  description: String,
  value: Option<Value>,
  updated_at: Option<Instant>,
  invalidated: bool,
  /// Bumped whenever running fetches must no longer write
  generation: u64,
  /// Bumped whenever `value` changes
  version: u64,
  last_accessed: Instant,
}

impl Entry {
  fn new(key: &impl QueryKey) -> Self {
    Self {
      namespace: key.namespace(),
      description: key.description(),
      value: None,
      updated_at: None,
      invalidated: false,
      generation: 0,
      version: 0,
      last_accessed: Instant::now(),
    }
  }
}

#[derive(Default)]
struct Inner {
  entries: HashMap<String, Entry>,
  next_version: u64,
}

impl Inner {
  fn entry(&mut self, key: &impl QueryKey) -> &mut Entry {
    self
      .entries
      .entry(key.cache_hash())
      .or_insert_with(|| Entry::new(key))
  }

  fn bump_version(&mut self) -> u64 {
    self.next_version += 1;
    self.next_version
  }
}

/// Proof that a fetch was started; only the latest ticket per key may write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
  hash: String,
  generation: u64,
}

/// Key-addressed cache of server responses.
///
/// Values are stored as JSON so one cache can hold any serializable result.
/// Cloning yields another handle to the same entries.
#[derive(Clone)]
pub struct QueryCache {
  inner: Arc<Mutex<Inner>>,
  stale_time: Duration,
}

impl QueryCache {
  pub fn new(stale_time: Duration) -> Self {
    Self {
      inner: Arc::new(Mutex::new(Inner::default())),
      stale_time,
    }
  }

  fn lock(&self) -> MutexGuard<'_, Inner> {
    self.inner.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Last known value for `key`. Never fails: undecodable data reads as absent.
  pub fn get<T: DeserializeOwned>(&self, key: &impl QueryKey) -> Option<T> {
    let mut inner = self.lock();
    let entry = inner.entries.get_mut(&key.cache_hash())?;
    entry.last_accessed = Instant::now();
    let value = entry.value.clone()?;
    match serde_json::from_value(value) {
      Ok(v) => Some(v),
      Err(e) => {
        warn!(key = %entry.description, error = %e, "cached value has unexpected shape");
        None
      }
    }
  }

  /// Store a fresh value for `key`
  pub fn set<T: Serialize>(&self, key: &impl QueryKey, value: &T) {
    let value = match serde_json::to_value(value) {
      Ok(v) => v,
      Err(e) => {
        warn!(key = %key.description(), error = %e, "could not serialize value for cache");
        return;
      }
    };

    let mut inner = self.lock();
    let version = inner.bump_version();
    let entry = inner.entry(key);
    entry.updated_at = Some(Instant::now());
    entry.last_accessed = Instant::now();
    entry.invalidated = false;
    if entry.value.as_ref() != Some(&value) {
      entry.value = Some(value);
      entry.version = version;
    }
  }

  /// Forget the value for `key`. The entry itself stays so its fetch
  /// generation keeps counting and older tickets stay superseded.
  pub fn remove(&self, key: &impl QueryKey) {
    if let Some(entry) = self.lock().entries.get_mut(&key.cache_hash()) {
      entry.value = None;
      entry.updated_at = None;
      entry.invalidated = false;
    }
  }

  /// Mark every entry in `namespace` stale. Returns how many were marked.
  pub fn invalidate(&self, namespace: &str) -> usize {
    let mut inner = self.lock();
    let mut count = 0;
    for entry in inner.entries.values_mut() {
      if entry.namespace == namespace {
        entry.invalidated = true;
        count += 1;
      }
    }
    debug!(namespace, count, "invalidated cache entries");
    count
  }

  /// Whether the next access should re-fetch
  pub fn is_stale(&self, key: &impl QueryKey) -> bool {
    let inner = self.lock();
    match inner.entries.get(&key.cache_hash()) {
      Some(entry) if entry.value.is_some() => {
        entry.invalidated
          || entry
            .updated_at
            .map(|t| t.elapsed() >= self.stale_time)
            .unwrap_or(true)
      }
      _ => true,
    }
  }

  pub fn is_invalidated(&self, key: &impl QueryKey) -> bool {
    self
      .lock()
      .entries
      .get(&key.cache_hash())
      .map(|e| e.invalidated)
      .unwrap_or(false)
  }

  /// Mark `key` as observed so garbage collection keeps it
  pub fn touch(&self, key: &impl QueryKey) {
    if let Some(entry) = self.lock().entries.get_mut(&key.cache_hash()) {
      entry.last_accessed = Instant::now();
    }
  }

  /// Changes whenever the stored value for `key` changes; 0 when absent
  pub fn version(&self, key: &impl QueryKey) -> u64 {
    self
      .lock()
      .entries
      .get(&key.cache_hash())
      .filter(|e| e.value.is_some())
      .map(|e| e.version)
      .unwrap_or(0)
  }

  /// Prevent any running fetch for `key` from writing its result
  pub fn cancel_in_flight(&self, key: &impl QueryKey) {
    let mut inner = self.lock();
    let entry = inner.entry(key);
    entry.generation += 1;
    debug!(key = %entry.description, generation = entry.generation, "cancelled in-flight fetches");
  }

  /// Register a new fetch for `key`, superseding earlier ones
  pub fn begin_fetch(&self, key: &impl QueryKey) -> FetchTicket {
    let mut inner = self.lock();
    let entry = inner.entry(key);
    entry.generation += 1;
    FetchTicket {
      hash: key.cache_hash(),
      generation: entry.generation,
    }
  }

  pub fn is_current(&self, ticket: &FetchTicket) -> bool {
    self
      .lock()
      .entries
      .get(&ticket.hash)
      .map(|e| e.generation == ticket.generation)
      .unwrap_or(false)
  }

  /// Store a fetch result if its ticket is still current. Returns whether it was written.
  pub fn complete_fetch<T: Serialize>(
    &self,
    key: &impl QueryKey,
    ticket: &FetchTicket,
    value: &T,
  ) -> bool {
    if ticket.hash != key.cache_hash() || !self.is_current(ticket) {
      debug!(key = %key.description(), "discarding superseded fetch result");
      return false;
    }
    self.set(key, value);
    true
  }

  /// Drop everything (used on logout)
  pub fn clear(&self) {
    let mut inner = self.lock();
    let count = inner.entries.len();
    inner.entries.clear();
    debug!(count, "cleared query cache");
  }

  /// Evict entries nobody has read for longer than `gc_time`
  pub fn collect_garbage(&self, gc_time: Duration) -> usize {
    let mut inner = self.lock();
    let before = inner.entries.len();
    inner
      .entries
      .retain(|_, e| e.last_accessed.elapsed() <= gc_time);
    let evicted = before - inner.entries.len();
    if evicted > 0 {
      debug!(evicted, "evicted unused cache entries");
    }
    evicted
  }

  pub fn len(&self) -> usize {
    self
      .lock()
      .entries
      .values()
      .filter(|e| e.value.is_some())
      .count()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

impl std::fmt::Debug for QueryCache {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("QueryCache")
      .field("entries", &self.len())
      .field("stale_time", &self.stale_time)
      .finish()
  }
}
