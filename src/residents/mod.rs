//! The residents registry: query keys, table state, forms and mutations.

pub mod form;
mod key;
pub mod optimistic;
mod service;
pub mod table;

pub use form::{Field, ResidentDraft, ValidationErrors};
pub use key::{ResidentsQuery, SortDirection, SortField};
pub use service::{MutationKind, MutationOutcome, ResidentMutation, ResidentsObserver, ResidentsService};
pub use table::{barangay_options, TableState};
