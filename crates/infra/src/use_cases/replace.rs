use tracing::instrument;

use fulfilment_core::ExpectedVersion;
use fulfilment_warehouses::{LocationPolicy, ProposedWarehouse, VersionedWarehouse, WarehouseValidator};

use super::WarehouseError;
use crate::store::WarehouseStore;
use crate::unit_of_work::UnitOfWork;

/// Replace location, capacity and stock of an active warehouse.
///
/// The write expects exactly the version that was validated. A concurrent
/// writer in between surfaces as `VersionConflict`; there is no retry.
#[derive(Debug)]
pub struct ReplaceWarehouse<'a, S, P> {
    store: &'a S,
    validator: &'a WarehouseValidator<P>,
}

impl<'a, S, P> ReplaceWarehouse<'a, S, P>
where
    S: WarehouseStore,
    P: LocationPolicy,
{
    pub fn new(store: &'a S, validator: &'a WarehouseValidator<P>) -> Self {
        Self { store, validator }
    }

    #[instrument(skip_all, fields(code = %proposed.business_unit_code, unit_of_work = %uow.id()))]
    pub fn execute(
        &self,
        uow: &mut UnitOfWork,
        proposed: &ProposedWarehouse,
    ) -> Result<VersionedWarehouse, WarehouseError> {
        let code = &proposed.business_unit_code;
        let current = self.store.find_for_update(uow, code)?;

        let validated = self
            .validator
            .validate_replacement(proposed, current.as_ref().map(|c| &c.warehouse))?;

        // validate_replacement already rejected a missing record
        let expected = ExpectedVersion::Exact(current.map_or(0, |c| c.version));

        Ok(self
            .store
            .versioned_update(uow, code, expected, &mut |w| validated.apply_to(w))?)
    }
}
