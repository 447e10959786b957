//! Warehouse use cases: validate, then write through the store inside a unit-of-work.
//!
//! ```text
//! load current → validate → versioned_update → commit → publish
//!                    ↓              ↓
//!                 reject        VersionConflict (no retry)
//! ```
//!
//! The individual use cases (`CreateWarehouse`, `ReplaceWarehouse`,
//! `ArchiveWarehouse`) run against a caller-supplied unit-of-work so several can
//! share one transaction. "Current" is read with
//! [`WarehouseStore::find_for_update`], so a later step validates against, and
//! expects the version of, what earlier steps in the same unit-of-work staged.
//! `WarehouseService` wraps each in its own unit-of-work via the [`Transactor`].

pub mod archive;
pub mod create;
pub mod replace;

pub use archive::ArchiveWarehouse;
pub use create::CreateWarehouse;
pub use replace::ReplaceWarehouse;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use fulfilment_core::{BusinessUnitCode, DomainError};
use fulfilment_events::EventBus;
use fulfilment_warehouses::{
    LocationPolicy, MutationOccurrence, ProposedWarehouse, VersionedWarehouse, WarehouseValidator,
};

use crate::store::{StoreError, WarehouseStore};
use crate::transactor::Transactor;

/// Error surfaced to callers of the warehouse use cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WarehouseError {
    /// Deterministic domain failure (validation, not found, conflict, ...).
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// Opaque infrastructure failure.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<StoreError> for WarehouseError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(code) => DomainError::not_found(code.as_str()).into(),
            StoreError::DuplicateKey(code) => DomainError::duplicate_key(code.as_str()).into(),
            StoreError::VersionConflict(msg) => DomainError::conflict(msg).into(),
            StoreError::AlreadyArchived(code) => DomainError::already_archived(code.as_str()).into(),
            StoreError::Unsupported(what) => WarehouseError::Unsupported(what),
            StoreError::Storage(msg) => WarehouseError::Storage(msg),
        }
    }
}

impl WarehouseError {
    /// `true` when a concurrent writer won; the caller may re-fetch and resubmit.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_conflict())
    }

    /// HTTP status a transport layer should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Domain(DomainError::NotFound(_)) => 404,
            Self::Domain(DomainError::VersionConflict(_) | DomainError::DuplicateKey(_)) => 409,
            Self::Domain(_) => 400,
            Self::Unsupported(_) => 405,
            Self::Storage(_) => 500,
        }
    }

    /// Stable machine-readable error code.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::NotFound(_)) => "not_found",
            Self::Domain(DomainError::VersionConflict(_)) => "conflict",
            Self::Domain(DomainError::DuplicateKey(_)) => "duplicate_key",
            Self::Domain(DomainError::AlreadyArchived(_)) => "already_archived",
            Self::Domain(DomainError::InvalidId(_)) => "invalid_id",
            Self::Domain(_) => "validation_error",
            Self::Unsupported(_) => "unsupported",
            Self::Storage(_) => "storage_error",
        }
    }
}

/// Entry point for warehouse mutations and reads.
///
/// Every mutation runs in its own unit-of-work; occurrences reach the bus only
/// after that unit-of-work committed.
#[derive(Debug, Clone)]
pub struct WarehouseService<S, P, B> {
    store: S,
    validator: WarehouseValidator<P>,
    transactor: Transactor<B>,
}

impl<S, P, B> WarehouseService<S, P, B>
where
    S: WarehouseStore,
    P: LocationPolicy,
    B: EventBus<MutationOccurrence> + Clone + 'static,
{
    pub fn new(store: S, policy: P, transactor: Transactor<B>) -> Self {
        Self {
            store,
            validator: WarehouseValidator::new(policy),
            transactor,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn transactor(&self) -> &Transactor<B> {
        &self.transactor
    }

    #[instrument(skip(self, proposed), fields(code = %proposed.business_unit_code))]
    pub fn create(&self, proposed: ProposedWarehouse) -> Result<VersionedWarehouse, WarehouseError> {
        let use_case = CreateWarehouse::new(&self.store, &self.validator);
        let stored = self
            .transactor
            .run(|uow| use_case.execute(uow, proposed, Utc::now()))
            .inspect_err(log_rejection)?;
        info!(version = stored.version, "warehouse created");
        Ok(stored)
    }

    #[instrument(skip(self, proposed), fields(code = %proposed.business_unit_code))]
    pub fn replace(&self, proposed: ProposedWarehouse) -> Result<VersionedWarehouse, WarehouseError> {
        let use_case = ReplaceWarehouse::new(&self.store, &self.validator);
        let stored = self
            .transactor
            .run(|uow| use_case.execute(uow, &proposed))
            .inspect_err(log_rejection)?;
        info!(version = stored.version, "warehouse replaced");
        Ok(stored)
    }

    #[instrument(skip(self), fields(code = %code))]
    pub fn archive(&self, code: &BusinessUnitCode) -> Result<VersionedWarehouse, WarehouseError> {
        let use_case = ArchiveWarehouse::new(&self.store, &self.validator);
        let stored = self
            .transactor
            .run(|uow| use_case.execute(uow, code, Utc::now()))
            .inspect_err(log_rejection)?;
        info!(version = stored.version, "warehouse archived");
        Ok(stored)
    }

    /// Committed record for `code`, archived ones included.
    pub fn get(&self, code: &BusinessUnitCode) -> Result<VersionedWarehouse, WarehouseError> {
        self.store
            .find_by_code(code)?
            .ok_or_else(|| DomainError::not_found(code.as_str()).into())
    }

    pub fn list_active(&self) -> Result<Vec<VersionedWarehouse>, WarehouseError> {
        Ok(self.store.get_all()?)
    }

    /// Physical removal is never offered.
    pub fn remove(&self, code: &BusinessUnitCode) -> Result<(), WarehouseError> {
        Ok(self.store.remove(code)?)
    }
}

fn log_rejection(err: &WarehouseError) {
    if err.is_conflict() {
        warn!(error = %err, "warehouse mutation lost a concurrent write");
    } else {
        info!(error = %err, status = err.http_status(), "warehouse mutation rejected");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(raw: &str) -> BusinessUnitCode {
        BusinessUnitCode::parse(raw).unwrap()
    }

    #[test]
    fn store_errors_map_onto_the_domain_taxonomy() {
        let err: WarehouseError = StoreError::NotFound(code("W-1")).into();
        assert_eq!(err.http_status(), 404);
        assert!(err.to_string().contains("does not exist"));

        let err: WarehouseError = StoreError::VersionConflict("stale".into()).into();
        assert!(err.is_conflict());
        assert_eq!(err.http_status(), 409);
        assert_eq!(err.error_code(), "conflict");

        let err: WarehouseError = StoreError::DuplicateKey(code("W-1")).into();
        assert_eq!(err.http_status(), 409);
        assert!(!err.is_conflict());

        let err: WarehouseError = StoreError::AlreadyArchived(code("W-1")).into();
        assert_eq!(err.http_status(), 400);

        let err: WarehouseError = StoreError::Unsupported("remove").into();
        assert_eq!(err.http_status(), 405);

        let err: WarehouseError = StoreError::Storage("disk".into()).into();
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        let cases = [
            DomainError::InvalidCapacity,
            DomainError::InvalidStock,
            DomainError::invalid_location("NOWHERE"),
            DomainError::CapacityExceedsLocationMax {
                location: "ZWOLLE-001".into(),
                capacity: 100,
                max_capacity: 40,
            },
            DomainError::StockExceedsCapacity { stock: 5, capacity: 1 },
            DomainError::already_archived("W-1"),
            DomainError::invalid_id("empty"),
        ];
        for domain in cases {
            let err = WarehouseError::from(domain);
            assert_eq!(err.http_status(), 400, "{err}");
            assert!(!err.is_conflict());
        }
    }
}
