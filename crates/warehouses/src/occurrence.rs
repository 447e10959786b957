use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fulfilment_core::{OccurrenceId, UnitOfWorkId};
use fulfilment_events::Event;

use crate::warehouse::Warehouse;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Created,
    Updated,
}

/// Record of a successful store write, bound to the unit-of-work that made it.
///
/// Produced by the store, held by the unit-of-work until commit, and handed to
/// the notifier exactly once if (and only if) that unit-of-work commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOccurrence {
    pub occurrence_id: OccurrenceId,
    pub unit_of_work_id: UnitOfWorkId,
    pub kind: MutationKind,
    /// Snapshot after the write.
    pub warehouse: Warehouse,
    /// Version after the write.
    pub version: u64,
    pub occurred_at: DateTime<Utc>,
}

impl MutationOccurrence {
    pub fn new(
        unit_of_work_id: UnitOfWorkId,
        kind: MutationKind,
        warehouse: Warehouse,
        version: u64,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            occurrence_id: OccurrenceId::new(),
            unit_of_work_id,
            kind,
            warehouse,
            version,
            occurred_at,
        }
    }
}

impl Event for MutationOccurrence {
    fn event_type(&self) -> &'static str {
        match self.kind {
            MutationKind::Created => "warehouse.created",
            MutationKind::Updated => "warehouse.updated",
        }
    }

    fn schema_version(&self) -> u32 {
        1
    }

    fn subject(&self) -> &str {
        self.warehouse.business_unit_code.as_str()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fulfilment_core::BusinessUnitCode;

    fn occurrence(kind: MutationKind) -> MutationOccurrence {
        MutationOccurrence::new(
            UnitOfWorkId::new(),
            kind,
            Warehouse {
                business_unit_code: BusinessUnitCode::parse("MWH.012").unwrap(),
                location: "AMSTERDAM-002".to_string(),
                capacity: 50,
                stock: 5,
                created_at: Utc::now(),
                archived_at: None,
            },
            3,
            Utc::now(),
        )
    }

    #[test]
    fn event_type_follows_kind() {
        assert_eq!(occurrence(MutationKind::Created).event_type(), "warehouse.created");
        assert_eq!(occurrence(MutationKind::Updated).event_type(), "warehouse.updated");
    }

    #[test]
    fn subject_is_the_business_unit_code() {
        let occ = occurrence(MutationKind::Updated);
        assert_eq!(occ.subject(), "MWH.012");
        assert_eq!(occ.schema_version(), 1);
    }

    #[test]
    fn every_occurrence_gets_its_own_id() {
        let a = occurrence(MutationKind::Created);
        let b = occurrence(MutationKind::Created);
        assert_ne!(a.occurrence_id, b.occurrence_id);
    }
}
