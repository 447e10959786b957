use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fulfilment_core::{AggregateRoot, BusinessUnitCode};

/// Warehouse snapshot.
///
/// `business_unit_code` and `created_at` never change after creation.
/// `archived_at` is set at most once; an archived warehouse is terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub business_unit_code: BusinessUnitCode,
    pub location: String,
    pub capacity: i64,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
}

impl Warehouse {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }

    pub fn is_active(&self) -> bool {
        !self.is_archived()
    }
}

/// A stored warehouse together with its optimistic-lock token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedWarehouse {
    pub warehouse: Warehouse,
    pub version: u64,
}

impl VersionedWarehouse {
    pub fn new(warehouse: Warehouse, version: u64) -> Self {
        Self { warehouse, version }
    }

    pub fn code(&self) -> &BusinessUnitCode {
        &self.warehouse.business_unit_code
    }

    pub fn into_inner(self) -> Warehouse {
        self.warehouse
    }
}

impl AggregateRoot for VersionedWarehouse {
    type Id = BusinessUnitCode;

    fn id(&self) -> &Self::Id {
        &self.warehouse.business_unit_code
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Proposed state submitted for creation or replacement.
///
/// `capacity` and `stock` are optional and signed so that missing or negative
/// input reaches the validator instead of being lost during parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedWarehouse {
    pub business_unit_code: BusinessUnitCode,
    pub location: String,
    #[serde(default)]
    pub capacity: Option<i64>,
    #[serde(default)]
    pub stock: Option<i64>,
}

impl ProposedWarehouse {
    pub fn new(
        business_unit_code: BusinessUnitCode,
        location: impl Into<String>,
        capacity: Option<i64>,
        stock: Option<i64>,
    ) -> Self {
        Self {
            business_unit_code,
            location: location.into(),
            capacity,
            stock,
        }
    }
}
