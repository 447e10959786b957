//! Domain primitives shared by every fulfilment crate: identifiers, the version token and the error taxonomy.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod aggregate;
pub mod error;
pub mod id;

pub use aggregate::{AggregateRoot, ExpectedVersion};
pub use error::{DomainError, DomainResult};
pub use id::{BusinessUnitCode, OccurrenceId, UnitOfWorkId};
