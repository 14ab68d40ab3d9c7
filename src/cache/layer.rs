//! List observer: serves cached data and re-fetches it in the background.

use futures::future::{BoxFuture, FutureExt};
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::store::{FetchTicket, QueryCache};
use super::traits::{QueryKey, RetryPolicy, Retryable};

type FetcherFn<K, T, E> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

type FetchResult<T, E> = (FetchTicket, Result<T, E>);

/// Watches one key at a time on behalf of a view.
///
/// Switching keys keeps the previous key's data visible as a placeholder
/// until the new key has data, so the table never flashes empty.
/// Fetch results are written to the cache on `poll()`, which the UI loop
/// calls every tick.
pub struct QueryObserver<K, T, E> {
  cache: QueryCache,
  fetcher: FetcherFn<K, T, E>,
  retry: RetryPolicy,
  key: Option<K>,
  current: Option<T>,
  placeholder: Option<T>,
  seen_version: u64,
  error: Option<E>,
  receiver: Option<mpsc::UnboundedReceiver<FetchResult<T, E>>>,
}

impl<K, T, E> QueryObserver<K, T, E>
where
  K: QueryKey + Clone + PartialEq + Send + 'static,
  T: Serialize + DeserializeOwned + Clone + Send + 'static,
  E: Retryable + std::fmt::Display + Send + 'static,
{
  pub fn new<F, Fut>(cache: QueryCache, retry: RetryPolicy, fetcher: F) -> Self
  where
    F: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    Self {
      cache,
      fetcher: Arc::new(move |key| fetcher(key).boxed()),
      retry,
      key: None,
      current: None,
      placeholder: None,
      seen_version: 0,
      error: None,
      receiver: None,
    }
  }

  pub fn key(&self) -> Option<&K> {
    self.key.as_ref()
  }

  /// Data to show: the current key's value, else the previous key's
  pub fn data(&self) -> Option<&T> {
    self.current.as_ref().or(self.placeholder.as_ref())
  }

  pub fn is_placeholder(&self) -> bool {
    self.current.is_none() && self.placeholder.is_some()
  }

  pub fn is_fetching(&self) -> bool {
    self.receiver.is_some()
  }

  /// Error from the latest fetch; cleared by the next success
  pub fn error(&self) -> Option<&E> {
    self.error.as_ref()
  }

  /// Observe `key`, fetching it when the cache has nothing fresh.
  pub fn set_key(&mut self, key: K) {
    if self.key.as_ref() == Some(&key) {
      return;
    }
    if let Some(previous) = self.current.take() {
      self.placeholder = Some(previous);
    }
    self.key = Some(key);
    self.error = None;
    self.receiver = None;
    self.sync_from_cache();
    if self.needs_fetch() {
      self.start_fetch();
    }
  }

  /// Fetch the current key now, superseding any running fetch
  pub fn refetch(&mut self) {
    if self.key.is_some() {
      self.start_fetch();
    }
  }

  /// The terminal regained focus: revalidate stale data
  pub fn on_focus(&mut self) {
    if !self.is_fetching() && self.needs_fetch() {
      self.start_fetch();
    }
  }

  /// Apply finished fetches and pick up cache writes made by others.
  ///
  /// Returns `true` when what the view should show has changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    if let Some(key) = &self.key {
      self.cache.touch(key);
    }

    if let Some(rx) = &mut self.receiver {
      match rx.try_recv() {
        Ok((ticket, result)) => {
          self.receiver = None;
          changed |= self.finish_fetch(ticket, result);
        }
        Err(mpsc::error::TryRecvError::Empty) => {}
        Err(mpsc::error::TryRecvError::Disconnected) => {
          self.receiver = None;
          changed = true;
        }
      }
    }

    changed |= self.sync_from_cache();

    // Someone invalidated our namespace (e.g. after a mutation)
    if !self.is_fetching() && self.error.is_none() {
      if let Some(key) = &self.key {
        if self.cache.is_invalidated(key) {
          self.start_fetch();
          changed = true;
        }
      }
    }

    changed
  }

  fn needs_fetch(&self) -> bool {
    match &self.key {
      Some(key) => self.cache.is_stale(key),
      None => false,
    }
  }

  fn finish_fetch(&mut self, ticket: FetchTicket, result: Result<T, E>) -> bool {
    let Some(key) = &self.key else {
      return false;
    };
    match result {
      Ok(value) => {
        if self.cache.complete_fetch(key, &ticket, &value) {
          self.error = None;
        }
        true
      }
      Err(e) => {
        if !self.cache.is_current(&ticket) {
          return false;
        }
        warn!(key = %key.description(), error = %e, "fetch failed");
        self.error = Some(e);
        true
      }
    }
  }

  /// Reload `current` if the cache entry changed since we last looked
  fn sync_from_cache(&mut self) -> bool {
    let Some(key) = &self.key else {
      return false;
    };
    let version = self.cache.version(key);
    if version == self.seen_version {
      return false;
    }
    self.seen_version = version;
    self.current = self.cache.get(key);
    if self.current.is_some() {
      self.placeholder = None;
    }
    true
  }

  fn start_fetch(&mut self) {
    let Some(key) = self.key.clone() else {
      return;
    };
    let ticket = self.cache.begin_fetch(&key);
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);

    let fetcher = Arc::clone(&self.fetcher);
    let cache = self.cache.clone();
    let retry = self.retry;
    debug!(key = %key.description(), "fetching");

    tokio::spawn(async move {
      let mut attempt = 0;
      let result = loop {
        match fetcher(key.clone()).await {
          Ok(value) => break Ok(value),
          Err(e) if e.is_retryable() && attempt < retry.retries && cache.is_current(&ticket) => {
            let delay = retry.delay(attempt);
            debug!(key = %key.description(), attempt, ?delay, error = %e, "retrying fetch");
            tokio::time::sleep(delay).await;
            attempt += 1;
          }
          Err(e) => break Err(e),
        }
      };
      // Ignore send errors - the observer may have moved on
      let _ = tx.send((ticket, result));
    });
  }
}
