use chrono::{DateTime, Utc};
use tracing::instrument;

use fulfilment_core::{BusinessUnitCode, ExpectedVersion};
use fulfilment_warehouses::{LocationPolicy, VersionedWarehouse, WarehouseValidator};

use super::WarehouseError;
use crate::store::WarehouseStore;
use crate::unit_of_work::UnitOfWork;

/// Archive a warehouse: `archived_at` goes from null to `now`, nothing else changes.
#[derive(Debug)]
pub struct ArchiveWarehouse<'a, S, P> {
    store: &'a S,
    validator: &'a WarehouseValidator<P>,
}

impl<'a, S, P> ArchiveWarehouse<'a, S, P>
where
    S: WarehouseStore,
    P: LocationPolicy,
{
    pub fn new(store: &'a S, validator: &'a WarehouseValidator<P>) -> Self {
        Self { store, validator }
    }

    #[instrument(skip_all, fields(code = %code, unit_of_work = %uow.id()))]
    pub fn execute(
        &self,
        uow: &mut UnitOfWork,
        code: &BusinessUnitCode,
        now: DateTime<Utc>,
    ) -> Result<VersionedWarehouse, WarehouseError> {
        let current = self.store.find_for_update(uow, code)?;
        self.validator
            .validate_archive(code, current.as_ref().map(|c| &c.warehouse))?;

        let expected = ExpectedVersion::Exact(current.map_or(0, |c| c.version));

        Ok(self
            .store
            .versioned_update(uow, code, expected, &mut |w| w.archived_at = Some(now))?)
    }
}
