//! Query cache for server data.
//!
//! - `QueryCache` holds the last known value per query key, grouped by namespace
//! - `QueryObserver` serves a view's current key with stale-while-revalidate
//! - `optimistic` writes speculative values around mutations and undoes them on failure

mod layer;
pub mod optimistic;
mod store;
mod traits;

pub use layer::QueryObserver;
pub use optimistic::{PendingMutation, Snapshot};
pub use store::{FetchTicket, QueryCache};
pub use traits::{QueryKey, RetryPolicy, Retryable};
