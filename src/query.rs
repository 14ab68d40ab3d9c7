//! One-shot async requests polled from the UI loop.
//!
//! A `Query<T, E>` runs a single future on the tokio runtime and hands the
//! result back through a channel. The event loop calls `poll()` on every tick,
//! so results are always applied on the UI task.
//!
//! # Example
//!
//! ```ignore
//! let api = client.clone();
//! let mut me = Query::idle();
//! me.run(async move { api.me().await });
//!
//! // In event loop tick
//! if me.poll() {
//!     // State changed, trigger re-render
//! }
//! ```
//!
//! List data goes through [`crate::cache::QueryObserver`] instead, which adds
//! caching and retries on top of the same spawn-and-poll model.

use std::future::Future;
use tokio::sync::oneshot;

/// The state of a query
#[derive(Debug, Clone)]
pub enum QueryState<T, E> {
  /// Query has not been started
  Idle,
  /// Query is currently running
  Loading,
  Success(T),
  Error(E),
}

impl<T, E> QueryState<T, E> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&E> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A single async request and its latest outcome.
pub struct Query<T, E> {
  state: QueryState<T, E>,
  receiver: Option<oneshot::Receiver<Result<T, E>>>,
}

impl<T, E> Default for Query<T, E> {
  fn default() -> Self {
    Self::idle()
  }
}

impl<T, E> Query<T, E> {
  pub fn idle() -> Self {
    Self {
      state: QueryState::Idle,
      receiver: None,
    }
  }

  pub fn state(&self) -> &QueryState<T, E> {
    &self.state
  }

  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Forget any outcome and drop a pending request's result
  pub fn reset(&mut self) {
    self.receiver = None;
    self.state = QueryState::Idle;
  }

  /// Take the finished outcome, leaving the query idle
  pub fn take(&mut self) -> Option<Result<T, E>> {
    match std::mem::replace(&mut self.state, QueryState::Idle) {
      QueryState::Success(data) => Some(Ok(data)),
      QueryState::Error(e) => Some(Err(e)),
      other => {
        self.state = other;
        None
      }
    }
  }
}

impl<T: Send + 'static, E: Send + 'static> Query<T, E> {
  /// Start `future`, replacing (and ignoring) any request still running.
  pub fn run<Fut>(&mut self, future: Fut)
  where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    let (tx, rx) = oneshot::channel();
    self.receiver = Some(rx);
    self.state = QueryState::Loading;

    tokio::spawn(async move {
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(future.await);
    });
  }

  /// Poll for the result of a pending request.
  ///
  /// Returns `true` if the state changed. Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.state = QueryState::Success(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.state = QueryState::Error(error);
        self.receiver = None;
        true
      }
      Err(oneshot::error::TryRecvError::Empty) => false,
      Err(oneshot::error::TryRecvError::Closed) => {
        // Task panicked or was aborted without sending
        self.state = QueryState::Idle;
        self.receiver = None;
        true
      }
    }
  }
}

impl<T: std::fmt::Debug, E: std::fmt::Debug> std::fmt::Debug for Query<T, E> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  async fn settle<T: Send + 'static, E: Send + 'static>(query: &mut Query<T, E>) {
    for _ in 0..50 {
      if query.poll() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
  }

  #[tokio::test]
  async fn test_query_success() {
    let mut query: Query<Vec<i32>, String> = Query::idle();
    assert!(matches!(query.state(), QueryState::Idle));

    query.run(async { Ok(vec![1, 2, 3]) });
    assert!(query.is_loading());

    settle(&mut query).await;
    assert_eq!(query.state().data(), Some(&vec![1, 2, 3]));
  }

  #[tokio::test]
  async fn test_query_error() {
    let mut query: Query<i32, String> = Query::idle();
    query.run(async { Err("Something went wrong".to_string()) });

    settle(&mut query).await;
    assert_eq!(
      query.state().error().map(String::as_str),
      Some("Something went wrong")
    );
  }

  #[tokio::test]
  async fn test_rerun_ignores_previous_request() {
    let mut query: Query<u32, String> = Query::idle();
    query.run(async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok(1)
    });
    query.run(async { Ok(2) });

    settle(&mut query).await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(!query.poll());
    assert_eq!(query.state().data(), Some(&2));
  }

  #[tokio::test]
  async fn test_take_leaves_idle() {
    let mut query: Query<u32, String> = Query::idle();
    assert!(query.take().is_none());

    query.run(async { Ok(7) });
    assert!(query.take().is_none());
    assert!(query.is_loading());

    settle(&mut query).await;
    assert_eq!(query.take(), Some(Ok(7)));
    assert!(matches!(query.state(), QueryState::Idle));
  }
}
