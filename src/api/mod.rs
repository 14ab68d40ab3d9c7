//! Registry REST API: wire types, domain types and the HTTP client.

mod api_types;
mod client;
mod error;
#[cfg(test)]
pub mod fixtures;
mod types;

pub use client::{ApiClient, Endpoint};
pub use error::ApiError;
pub use types::{
  page_count, AuthSession, CivilStatus, Gender, NewResident, Paginated, Resident, ResidentPatch,
  User,
};
