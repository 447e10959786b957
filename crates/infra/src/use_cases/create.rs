use chrono::{DateTime, Utc};
use tracing::instrument;

use fulfilment_warehouses::{LocationPolicy, ProposedWarehouse, VersionedWarehouse, Warehouse, WarehouseValidator};

use super::WarehouseError;
use crate::store::WarehouseStore;
use crate::unit_of_work::UnitOfWork;

/// Create a warehouse at version 1.
///
/// Missing stock defaults to 0. Only the payload rules apply; a duplicate code
/// is detected by the store.
#[derive(Debug)]
pub struct CreateWarehouse<'a, S, P> {
    store: &'a S,
    validator: &'a WarehouseValidator<P>,
}

impl<'a, S, P> CreateWarehouse<'a, S, P>
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
        mut proposed: ProposedWarehouse,
        now: DateTime<Utc>,
    ) -> Result<VersionedWarehouse, WarehouseError> {
        proposed.stock.get_or_insert(0);
        let validated = self.validator.validate_creation(&proposed)?;

        let warehouse = Warehouse {
            business_unit_code: proposed.business_unit_code,
            location: validated.location,
            capacity: validated.capacity,
            stock: validated.stock,
            created_at: now,
            archived_at: None,
        };

        Ok(self.store.create(uow, warehouse)?)
    }
}
