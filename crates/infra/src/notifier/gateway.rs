use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use fulfilment_warehouses::Warehouse;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegacyGatewayError {
    #[error("legacy system unavailable: {0}")]
    Unavailable(String),
}

/// Client of the legacy warehouse system.
///
/// Receives committed snapshots only. Calls may be repeated for the same
/// snapshot, so implementations should tolerate duplicates.
pub trait LegacyWarehouseGateway: Send + Sync {
    fn create_warehouse(&self, warehouse: &Warehouse) -> Result<(), LegacyGatewayError>;

    fn update_warehouse(&self, warehouse: &Warehouse) -> Result<(), LegacyGatewayError>;
}

impl<G> LegacyWarehouseGateway for Arc<G>
where
    G: LegacyWarehouseGateway + ?Sized,
{
    fn create_warehouse(&self, warehouse: &Warehouse) -> Result<(), LegacyGatewayError> {
        (**self).create_warehouse(warehouse)
    }

    fn update_warehouse(&self, warehouse: &Warehouse) -> Result<(), LegacyGatewayError> {
        (**self).update_warehouse(warehouse)
    }
}

/// Gateway that only traces what would be sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingLegacyGateway;

impl LegacyWarehouseGateway for LoggingLegacyGateway {
    fn create_warehouse(&self, warehouse: &Warehouse) -> Result<(), LegacyGatewayError> {
        info!(
            code = %warehouse.business_unit_code,
            location = %warehouse.location,
            capacity = warehouse.capacity,
            stock = warehouse.stock,
            "legacy sync: warehouse created"
        );
        Ok(())
    }

    fn update_warehouse(&self, warehouse: &Warehouse) -> Result<(), LegacyGatewayError> {
        info!(
            code = %warehouse.business_unit_code,
            location = %warehouse.location,
            capacity = warehouse.capacity,
            stock = warehouse.stock,
            archived = warehouse.is_archived(),
            "legacy sync: warehouse updated"
        );
        Ok(())
    }
}
