//! Warehouse domain module.
//!
//! Business rules for warehouses, implemented purely as deterministic domain
//! logic (no IO, no HTTP, no storage). Persistence, transactions and delivery of
//! mutation occurrences live in `fulfilment-infra`.

pub mod location;
pub mod occurrence;
pub mod validator;
pub mod warehouse;

pub use location::{Location, LocationPolicy, StaticLocationPolicy};
pub use occurrence::{MutationKind, MutationOccurrence};
pub use validator::{ValidatedWarehouse, ValidationMode, WarehouseValidator, validate, validate_archive};
pub use warehouse::{ProposedWarehouse, VersionedWarehouse, Warehouse};
