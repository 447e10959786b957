use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use chrono::Utc;
use tracing::{debug, instrument, warn};

use fulfilment_core::{AggregateRoot, BusinessUnitCode, ExpectedVersion, UnitOfWorkId};
use fulfilment_warehouses::{MutationKind, MutationOccurrence, VersionedWarehouse, Warehouse};

use super::r#trait::{StoreError, WarehouseStore};
use crate::unit_of_work::{StagedWrite, UnitOfWork};

/// Version assigned by `create`.
pub const INITIAL_VERSION: u64 = 1;

/// Uncommitted write held by one unit-of-work.
#[derive(Debug)]
struct Claim {
    owner: UnitOfWorkId,
    staged: VersionedWarehouse,
    applied: bool,
}

/// One record: the committed value plus at most one in-flight claim.
///
/// A slot that never committed is dropped from the index when its claim is
/// discarded and marked `retired`; writers holding a stale handle to it look
/// the code up again.
#[derive(Debug, Default)]
struct Slot {
    committed: Option<VersionedWarehouse>,
    claim: Option<Claim>,
    retired: bool,
}

type SlotRef = Arc<Mutex<Slot>>;
type SlotIndex = Arc<RwLock<HashMap<BusinessUnitCode, SlotRef>>>;

/// In-memory warehouse store.
///
/// Every record has its own lock, held only for the duration of a single check
/// or copy. Conflicting writes on one code are serialised there; writes on
/// different codes never contend beyond the map lookup.
///
/// Lock order is index before slot. Nothing takes the index lock while holding
/// a slot lock.
#[derive(Debug, Default)]
pub struct InMemoryWarehouseStore {
    slots: SlotIndex,
}

impl InMemoryWarehouseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn slot(&self, code: &BusinessUnitCode) -> Result<Option<SlotRef>, StoreError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(slots.get(code).cloned())
    }

    fn slot_or_insert(&self, code: &BusinessUnitCode) -> Result<SlotRef, StoreError> {
        if let Some(slot) = self.slot(code)? {
            return Ok(slot);
        }
        let mut slots = self
            .slots
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(slots.entry(code.clone()).or_default().clone())
    }

    fn all_slots(&self) -> Result<Vec<SlotRef>, StoreError> {
        let slots = self
            .slots
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".to_string()))?;
        Ok(slots.values().cloned().collect())
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.read().map(|s| s.len()).unwrap_or_default()
    }

    fn stage_write(&self, uow: &mut UnitOfWork, code: &BusinessUnitCode, slot: SlotRef) {
        uow.stage(Box::new(SlotWrite {
            slot,
            code: code.clone(),
            index: Arc::clone(&self.slots),
            owner: uow.id(),
        }));
    }
}

fn lock(slot: &SlotRef) -> Result<MutexGuard<'_, Slot>, StoreError> {
    slot.lock()
        .map_err(|_| StoreError::Storage("lock poisoned".to_string()))
}

impl WarehouseStore for InMemoryWarehouseStore {
    fn get_all(&self) -> Result<Vec<VersionedWarehouse>, StoreError> {
        let mut active = Vec::new();
        for slot in self.all_slots()? {
            let guard = lock(&slot)?;
            if let Some(committed) = guard.committed.as_ref() {
                if committed.warehouse.is_active() {
                    active.push(committed.clone());
                }
            }
        }
        Ok(active)
    }

    fn find_by_code(&self, code: &BusinessUnitCode) -> Result<Option<VersionedWarehouse>, StoreError> {
        match self.slot(code)? {
            Some(slot) => Ok(lock(&slot)?.committed.clone()),
            None => Ok(None),
        }
    }

    fn find_for_update(
        &self,
        uow: &UnitOfWork,
        code: &BusinessUnitCode,
    ) -> Result<Option<VersionedWarehouse>, StoreError> {
        let Some(slot) = self.slot(code)? else {
            return Ok(None);
        };
        let guard = lock(&slot)?;
        match guard.claim.as_ref() {
            Some(claim) if claim.owner == uow.id() => Ok(Some(claim.staged.clone())),
            _ => Ok(guard.committed.clone()),
        }
    }

    #[instrument(
        skip(self, uow, warehouse),
        fields(code = %warehouse.business_unit_code, unit_of_work = %uow.id()),
        err
    )]
    fn create(
        &self,
        uow: &mut UnitOfWork,
        warehouse: Warehouse,
    ) -> Result<VersionedWarehouse, StoreError> {
        let code = warehouse.business_unit_code.clone();
        let stored = VersionedWarehouse::new(warehouse, INITIAL_VERSION);

        let slot = loop {
            let slot = self.slot_or_insert(&code)?;
            let mut guard = lock(&slot)?;
            if guard.retired {
                continue;
            }
            if guard.committed.is_some() || guard.claim.is_some() {
                return Err(StoreError::DuplicateKey(code));
            }
            guard.claim = Some(Claim {
                owner: uow.id(),
                staged: stored.clone(),
                applied: false,
            });
            drop(guard);
            break slot;
        };

        debug!("record claimed for create");
        self.stage_write(uow, &code, slot);
        uow.record(MutationOccurrence::new(
            uow.id(),
            MutationKind::Created,
            stored.warehouse.clone(),
            stored.version,
            Utc::now(),
        ));

        Ok(stored)
    }

    #[instrument(
        skip(self, uow, mutator),
        fields(code = %code, expected_version = ?expected_version, unit_of_work = %uow.id()),
        err
    )]
    fn versioned_update(
        &self,
        uow: &mut UnitOfWork,
        code: &BusinessUnitCode,
        expected_version: ExpectedVersion,
        mutator: &mut dyn FnMut(&mut Warehouse),
    ) -> Result<VersionedWarehouse, StoreError> {
        let slot = self
            .slot(code)?
            .ok_or_else(|| StoreError::NotFound(code.clone()))?;

        let (stored, newly_claimed) = {
            let mut guard = lock(&slot)?;
            let record: &mut Slot = &mut guard;

            let (base, newly_claimed) = match (&record.claim, &record.committed) {
                (Some(claim), _) if claim.owner == uow.id() => (claim.staged.clone(), false),
                (Some(_), None) | (None, None) => return Err(StoreError::NotFound(code.clone())),
                (Some(_), Some(_)) => {
                    warn!("record claimed by another unit of work");
                    return Err(StoreError::VersionConflict(format!(
                        "warehouse '{code}' is being modified by another unit of work"
                    )));
                }
                (None, Some(committed)) => (committed.clone(), true),
            };

            if let Err(stale) = expected_version.check(base.version()) {
                warn!(actual_version = base.version(), "stale expected version");
                return Err(StoreError::VersionConflict(format!("warehouse '{code}': {stale}")));
            }

            if base.warehouse.is_archived() {
                return Err(StoreError::AlreadyArchived(code.clone()));
            }

            let mut next = base.warehouse.clone();
            mutator(&mut next);
            next.business_unit_code = base.warehouse.business_unit_code.clone();
            next.created_at = base.warehouse.created_at;

            let stored = VersionedWarehouse::new(next, base.version() + 1);
            record.claim = Some(Claim {
                owner: uow.id(),
                staged: stored.clone(),
                applied: false,
            });
            (stored, newly_claimed)
        };

        debug!(new_version = stored.version, "record claimed for update");
        if newly_claimed {
            self.stage_write(uow, code, slot);
        }
        uow.record(MutationOccurrence::new(
            uow.id(),
            MutationKind::Updated,
            stored.warehouse.clone(),
            stored.version,
            Utc::now(),
        ));

        Ok(stored)
    }
}

/// Staged write for one slot. Only touches the slot while `owner` holds the claim.
struct SlotWrite {
    slot: SlotRef,
    code: BusinessUnitCode,
    index: SlotIndex,
    owner: UnitOfWorkId,
}

impl SlotWrite {
    fn with_slot(&self, f: impl FnOnce(&mut Slot)) {
        // Critical sections never panic mid-update; a poisoned slot is still consistent.
        let mut guard = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        let owned = guard.claim.as_ref().is_some_and(|c| c.owner == self.owner);
        if owned {
            f(&mut guard);
        }
    }
}

impl StagedWrite for SlotWrite {
    fn apply(&self) {
        self.with_slot(|slot| {
            if let Some(claim) = slot.claim.as_mut() {
                slot.committed = Some(claim.staged.clone());
                claim.applied = true;
            }
        });
    }

    fn release(&self) {
        self.with_slot(|slot| slot.claim = None);
    }

    fn discard(&self) {
        let mut index = self.index.write().unwrap_or_else(|e| e.into_inner());
        self.with_slot(|slot| {
            if let Some(claim) = slot.claim.take() {
                debug_assert!(!claim.applied, "discarding an applied write");
            }
            if slot.committed.is_none() {
                slot.retired = true;
                if index.get(&self.code).is_some_and(|s| Arc::ptr_eq(s, &self.slot)) {
                    index.remove(&self.code);
                }
            }
        });
    }
}
