//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// invariants, conflicts). Infrastructure concerns belong elsewhere.
///
/// Messages are part of the contract: callers and tests match on fragments such
/// as `"does not exist"` or `"exceeds location max capacity"`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// No record exists for the business unit code.
    #[error("Warehouse with business unit code '{0}' does not exist")]
    NotFound(String),

    /// A record with the business unit code already exists.
    #[error("Warehouse with business unit code '{0}' already exists")]
    DuplicateKey(String),

    /// The record is archived; archived is terminal.
    #[error("Warehouse '{0}' is archived: cannot mutate an archived warehouse")]
    AlreadyArchived(String),

    /// Proposed capacity is missing or negative.
    #[error("Warehouse capacity must be a non-negative value")]
    InvalidCapacity,

    /// Proposed stock is missing or negative.
    #[error("Warehouse stock must be a non-negative value")]
    InvalidStock,

    /// Proposed location is not part of the location policy.
    #[error("Warehouse location '{0}' is not valid")]
    InvalidLocation(String),

    /// Proposed capacity is larger than the location allows.
    #[error("Warehouse capacity {capacity} exceeds location max capacity {max_capacity} for '{location}'")]
    CapacityExceedsLocationMax {
        location: String,
        capacity: i64,
        max_capacity: i64,
    },

    /// Proposed stock does not fit in the proposed capacity.
    #[error("Warehouse stock {stock} exceeds warehouse capacity {capacity}")]
    StockExceedsCapacity { stock: i64, capacity: i64 },

    /// A conflicting write won the race (stale version / optimistic concurrency).
    #[error("version conflict: {0}")]
    VersionConflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl DomainError {
    pub fn not_found(code: impl Into<String>) -> Self {
        Self::NotFound(code.into())
    }

    pub fn duplicate_key(code: impl Into<String>) -> Self {
        Self::DuplicateKey(code.into())
    }

    pub fn already_archived(code: impl Into<String>) -> Self {
        Self::AlreadyArchived(code.into())
    }

    pub fn invalid_location(location: impl Into<String>) -> Self {
        Self::InvalidLocation(location.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::VersionConflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    /// `true` for the only failure expected under normal concurrent operation.
    ///
    /// Callers may re-fetch and resubmit on a conflict; every other variant is
    /// terminal for the given input.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict(_))
    }

    /// `true` for failures produced by the validation gate.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::AlreadyArchived(_)
                | Self::InvalidCapacity
                | Self::InvalidStock
                | Self::InvalidLocation(_)
                | Self::CapacityExceedsLocationMax { .. }
                | Self::StockExceedsCapacity { .. }
        )
    }
}
