//! Residents data access: cached listing plus optimistic mutations.

use tracing::{info, warn};

use super::key::ResidentsQuery;
use super::optimistic::{apply_create, apply_delete, apply_update, placeholder_id};
use crate::api::{ApiClient, ApiError, NewResident, Paginated, Resident, ResidentPatch};
use crate::cache::{PendingMutation, QueryCache, QueryObserver, RetryPolicy};

pub type ResidentsObserver = QueryObserver<ResidentsQuery, Paginated<Resident>, ApiError>;

/// What a mutation does, for status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
  Add,
  Update,
  Archive,
}

impl MutationKind {
  pub fn pending_message(&self) -> &'static str {
    match self {
      MutationKind::Add => "Adding resident...",
      MutationKind::Update => "Updating resident...",
      MutationKind::Archive => "Archiving resident...",
    }
  }

  pub fn success_message(&self) -> &'static str {
    match self {
      MutationKind::Add => "Resident added",
      MutationKind::Update => "Resident updated",
      MutationKind::Archive => "Resident archived",
    }
  }

  pub fn failure_message(&self, reason: &str) -> String {
    let action = match self {
      MutationKind::Add => "add",
      MutationKind::Update => "update",
      MutationKind::Archive => "archive",
    };
    format!("Failed to {} resident: {}", action, reason)
  }
}

/// How a finished mutation went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
  Saved(String),
  Failed { message: String, session_expired: bool },
}

/// A create/update/archive whose optimistic change is already in the cache
pub struct ResidentMutation {
  kind: MutationKind,
  pending: PendingMutation<ResidentsQuery, Paginated<Resident>, (), ApiError>,
}

impl ResidentMutation {
  pub fn kind(&self) -> MutationKind {
    self.kind
  }

  /// Settle against the cache once the request has finished
  pub fn poll(&mut self) -> Option<MutationOutcome> {
    let outcome = self.pending.poll()?;
    Some(match outcome {
      Some(Ok(())) => {
        info!(mutation = self.pending.label(), "mutation saved");
        MutationOutcome::Saved(self.kind.success_message().to_string())
      }
      Some(Err(e)) => {
        warn!(mutation = self.pending.label(), error = %e, "mutation failed, rolled back");
        MutationOutcome::Failed {
          message: self.kind.failure_message(&e.to_string()),
          session_expired: e.is_session_expired(),
        }
      }
      None => MutationOutcome::Failed {
        message: self.kind.failure_message("request was interrupted"),
        session_expired: false,
      },
    })
  }
}

/// Cloneable handle tying the API client to the shared cache.
#[derive(Clone)]
pub struct ResidentsService {
  client: ApiClient,
  cache: QueryCache,
  retry: RetryPolicy,
}

impl ResidentsService {
  pub fn new(client: ApiClient, cache: QueryCache, retry: RetryPolicy) -> Self {
    Self {
      client,
      cache,
      retry,
    }
  }

  #[cfg(test)]
  pub fn cache(&self) -> &QueryCache {
    &self.cache
  }

  /// Observer for residents pages, retrying list fetches per the policy
  pub fn observer(&self) -> ResidentsObserver {
    let client = self.client.clone();
    QueryObserver::new(self.cache.clone(), self.retry, move |key: ResidentsQuery| {
      let client = client.clone();
      async move { client.list_residents(&key).await }
    })
  }

  /// Show `payload` at the top of the page under `key` while it is being created
  pub fn create(&self, key: &ResidentsQuery, payload: NewResident) -> ResidentMutation {
    let client = self.client.clone();
    let page_size = key.page_size;
    let id = placeholder_id();
    let body = payload.clone();
    let pending = PendingMutation::start(
      &self.cache,
      key,
      "create resident",
      move |prev| apply_create(prev, payload, page_size, id),
      async move { client.create_resident(&body).await.map(|_| ()) },
    );
    ResidentMutation {
      kind: MutationKind::Add,
      pending,
    }
  }

  pub fn update(&self, key: &ResidentsQuery, id: i64, patch: ResidentPatch) -> ResidentMutation {
    let client = self.client.clone();
    let body = patch.clone();
    let pending = PendingMutation::start(
      &self.cache,
      key,
      format!("update resident {}", id),
      move |prev| apply_update(prev, id, &patch),
      async move { client.update_resident(id, &body).await.map(|_| ()) },
    );
    ResidentMutation {
      kind: MutationKind::Update,
      pending,
    }
  }

  /// Archive (soft-delete) resident `id`, hiding it immediately
  pub fn archive(&self, key: &ResidentsQuery, id: i64) -> ResidentMutation {
    let client = self.client.clone();
    let pending = PendingMutation::start(
      &self.cache,
      key,
      format!("archive resident {}", id),
      move |prev| apply_delete(prev, id),
      async move { client.archive_resident(id).await.map(|_| ()) },
    );
    ResidentMutation {
      kind: MutationKind::Archive,
      pending,
    }
  }
}
