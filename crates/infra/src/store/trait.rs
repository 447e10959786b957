use std::sync::Arc;

use thiserror::Error;

use fulfilment_core::{BusinessUnitCode, ExpectedVersion};
use fulfilment_warehouses::{VersionedWarehouse, Warehouse};

use crate::unit_of_work::UnitOfWork;

/// Store operation error.
///
/// `VersionConflict` is the only failure expected under normal concurrent
/// operation. `Storage` is opaque infrastructure failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("warehouse '{0}' not found")]
    NotFound(BusinessUnitCode),

    #[error("warehouse '{0}' already exists")]
    DuplicateKey(BusinessUnitCode),

    #[error("optimistic concurrency check failed: {0}")]
    VersionConflict(String),

    #[error("warehouse '{0}' is archived")]
    AlreadyArchived(BusinessUnitCode),

    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Persistence abstraction for warehouse records.
///
/// ## Write semantics
///
/// - `create` stores version 1 and fails with `DuplicateKey` if the code is
///   already committed or claimed by another unit-of-work.
/// - `versioned_update` checks `expected_version` and claims the record in one
///   atomic step with respect to every other write on the same code. Two
///   writers that both read version N can never both succeed: the loser fails
///   with `VersionConflict` immediately, without waiting.
/// - Every successful write records exactly one mutation occurrence in the
///   unit-of-work.
/// - `business_unit_code` and `created_at` are restored after the mutator
///   runs; an archived record rejects every further write.
///
/// ## Read semantics
///
/// Reads never wait on writers and observe committed values only, except
/// `find_for_update`, which lets a unit-of-work see its own staged writes.
pub trait WarehouseStore: Send + Sync {
    /// Active (non-archived) warehouses, in no particular order.
    fn get_all(&self) -> Result<Vec<VersionedWarehouse>, StoreError>;

    /// Committed record for `code`, archived or not.
    fn find_by_code(&self, code: &BusinessUnitCode) -> Result<Option<VersionedWarehouse>, StoreError>;

    /// Record as `uow` sees it: its own staged write if it holds one, the
    /// committed value otherwise. Use cases validate against this and take
    /// the expected version from it, so several can share one unit-of-work.
    fn find_for_update(
        &self,
        uow: &UnitOfWork,
        code: &BusinessUnitCode,
    ) -> Result<Option<VersionedWarehouse>, StoreError>;

    fn create(
        &self,
        uow: &mut UnitOfWork,
        warehouse: Warehouse,
    ) -> Result<VersionedWarehouse, StoreError>;

    fn versioned_update(
        &self,
        uow: &mut UnitOfWork,
        code: &BusinessUnitCode,
        expected_version: ExpectedVersion,
        mutator: &mut dyn FnMut(&mut Warehouse),
    ) -> Result<VersionedWarehouse, StoreError>;

    /// Physical removal is not offered; archive instead.
    fn remove(&self, _code: &BusinessUnitCode) -> Result<(), StoreError> {
        Err(StoreError::Unsupported("remove: archive the warehouse instead"))
    }
}

impl<S> WarehouseStore for Arc<S>
where
    S: WarehouseStore + ?Sized,
{
    fn get_all(&self) -> Result<Vec<VersionedWarehouse>, StoreError> {
        (**self).get_all()
    }

    fn find_by_code(&self, code: &BusinessUnitCode) -> Result<Option<VersionedWarehouse>, StoreError> {
        (**self).find_by_code(code)
    }

    fn find_for_update(
        &self,
        uow: &UnitOfWork,
        code: &BusinessUnitCode,
    ) -> Result<Option<VersionedWarehouse>, StoreError> {
        (**self).find_for_update(uow, code)
    }

    fn create(
        &self,
        uow: &mut UnitOfWork,
        warehouse: Warehouse,
    ) -> Result<VersionedWarehouse, StoreError> {
        (**self).create(uow, warehouse)
    }

    fn versioned_update(
        &self,
        uow: &mut UnitOfWork,
        code: &BusinessUnitCode,
        expected_version: ExpectedVersion,
        mutator: &mut dyn FnMut(&mut Warehouse),
    ) -> Result<VersionedWarehouse, StoreError> {
        (**self).versioned_update(uow, code, expected_version, mutator)
    }

    fn remove(&self, code: &BusinessUnitCode) -> Result<(), StoreError> {
        (**self).remove(code)
    }
}
