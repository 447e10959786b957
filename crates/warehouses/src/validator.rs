//! Validation gate for proposed warehouse state.
//!
//! Rules run in a fixed order and the first failure wins, so the same input
//! always yields the same error:
//!
//! 1. current record required but missing → `NotFound`
//! 2. current record archived → `AlreadyArchived`
//! 3. capacity missing or negative → `InvalidCapacity`
//! 4. stock missing or negative → `InvalidStock`
//! 5. unknown location → `InvalidLocation`
//! 6. capacity above the location maximum → `CapacityExceedsLocationMax`
//! 7. stock above capacity → `StockExceedsCapacity`
//!
//! Creation skips rules 1-2 (there is no current record). Archiving runs rules
//! 1-2 only.

use fulfilment_core::{BusinessUnitCode, DomainError, DomainResult};

use crate::location::LocationPolicy;
use crate::warehouse::{ProposedWarehouse, Warehouse};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ValidationMode {
    /// No current record is involved.
    Create,
    /// A current, active record must exist.
    Replace,
}

/// Proposed state that passed every rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedWarehouse {
    pub location: String,
    pub capacity: i64,
    pub stock: i64,
    pub max_capacity: i64,
}

impl ValidatedWarehouse {
    /// Copy the validated attributes onto a stored snapshot.
    pub fn apply_to(&self, warehouse: &mut Warehouse) {
        warehouse.location = self.location.clone();
        warehouse.capacity = self.capacity;
        warehouse.stock = self.stock;
    }
}

/// Validate a proposed state against the current record and the location policy.
///
/// Pure: no side effects, same inputs give the same result.
pub fn validate<P>(
    proposed: &ProposedWarehouse,
    current: Option<&Warehouse>,
    mode: ValidationMode,
    policy: &P,
) -> DomainResult<ValidatedWarehouse>
where
    P: LocationPolicy + ?Sized,
{
    if mode == ValidationMode::Replace {
        ensure_mutable(&proposed.business_unit_code, current)?;
    }

    let capacity = match proposed.capacity {
        Some(c) if c >= 0 => c,
        _ => return Err(DomainError::InvalidCapacity),
    };
    let stock = match proposed.stock {
        Some(s) if s >= 0 => s,
        _ => return Err(DomainError::InvalidStock),
    };

    let location = policy
        .resolve(&proposed.location)
        .ok_or_else(|| DomainError::invalid_location(&proposed.location))?;

    if capacity > location.max_capacity {
        return Err(DomainError::CapacityExceedsLocationMax {
            location: location.identification,
            capacity,
            max_capacity: location.max_capacity,
        });
    }

    if stock > capacity {
        return Err(DomainError::StockExceedsCapacity { stock, capacity });
    }

    Ok(ValidatedWarehouse {
        location: location.identification,
        capacity,
        stock,
        max_capacity: location.max_capacity,
    })
}

/// Rules 1-2 only: the record must exist and must not be archived yet.
pub fn validate_archive(code: &BusinessUnitCode, current: Option<&Warehouse>) -> DomainResult<()> {
    ensure_mutable(code, current)
}

fn ensure_mutable(code: &BusinessUnitCode, current: Option<&Warehouse>) -> DomainResult<()> {
    let current = current.ok_or_else(|| DomainError::not_found(code.as_str()))?;
    if current.is_archived() {
        return Err(DomainError::already_archived(code.as_str()));
    }
    Ok(())
}

/// Validator bound to a location policy.
#[derive(Debug, Clone)]
pub struct WarehouseValidator<P> {
    policy: P,
}

impl<P> WarehouseValidator<P>
where
    P: LocationPolicy,
{
    pub fn new(policy: P) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn validate_creation(&self, proposed: &ProposedWarehouse) -> DomainResult<ValidatedWarehouse> {
        validate(proposed, None, ValidationMode::Create, &self.policy)
    }

    pub fn validate_replacement(
        &self,
        proposed: &ProposedWarehouse,
        current: Option<&Warehouse>,
    ) -> DomainResult<ValidatedWarehouse> {
        validate(proposed, current, ValidationMode::Replace, &self.policy)
    }

    pub fn validate_archive(
        &self,
        code: &BusinessUnitCode,
        current: Option<&Warehouse>,
    ) -> DomainResult<()> {
        validate_archive(code, current)
    }
}
