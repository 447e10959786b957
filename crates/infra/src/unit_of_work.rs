//! Unit-of-work: the transaction boundary for warehouse mutations.
//!
//! Store writes inside a unit-of-work are *staged*: the record is claimed for
//! this unit-of-work and its new value is invisible to readers until `commit()`.
//! Every successful write also records a [`MutationOccurrence`]. Occurrences are
//! handed to post-commit hooks only after every staged write was applied, and
//! are dropped unseen on rollback.
//!
//! ## Commit sequence
//!
//! ```text
//! 1. apply()    every staged write   (new value + version become visible)
//! 2. hooks      run with the recorded occurrences
//! 3. release()  every claim          (other writers may claim the records again)
//! ```
//!
//! Claims are held while hooks run, so for a given warehouse occurrences leave
//! the unit-of-work in commit order. Between steps 1 and 3 a record is readable
//! at its new version but still claimed: a writer in another unit-of-work that
//! already read the new version fails with `VersionConflict` until the hooks
//! return. The window lasts as long as publishing does, and the same write
//! succeeds once `commit()` has returned.
//!
//! Dropping an active unit-of-work rolls it back.

use tracing::{debug, info};

use fulfilment_core::UnitOfWorkId;
use fulfilment_warehouses::MutationOccurrence;

/// A write staged by a store inside a unit-of-work.
///
/// The store has already checked the version and claimed the record when the
/// write is staged, so applying it cannot fail.
pub trait StagedWrite: Send {
    /// Make the staged value the committed value. The claim stays held.
    fn apply(&self);

    /// Release the claim after commit.
    fn release(&self);

    /// Drop the staged value and release the claim. A record that was never
    /// committed is forgotten entirely.
    fn discard(&self);
}

/// Callback run after a durable commit.
pub type CommitHook = Box<dyn FnOnce(&[MutationOccurrence]) + Send>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UnitOfWorkState {
    Active,
    Committed,
    RolledBack,
}

/// Summary of a committed unit-of-work.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub unit_of_work_id: UnitOfWorkId,
    pub writes: usize,
    pub occurrences: usize,
}

pub struct UnitOfWork {
    id: UnitOfWorkId,
    state: UnitOfWorkState,
    staged: Vec<Box<dyn StagedWrite>>,
    occurrences: Vec<MutationOccurrence>,
    hooks: Vec<CommitHook>,
}

impl core::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("staged", &self.staged.len())
            .field("occurrences", &self.occurrences.len())
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl UnitOfWork {
    pub fn begin() -> Self {
        let id = UnitOfWorkId::new();
        debug!(unit_of_work = %id, "unit of work started");
        Self {
            id,
            state: UnitOfWorkState::Active,
            staged: Vec::new(),
            occurrences: Vec::new(),
            hooks: Vec::new(),
        }
    }

    pub fn id(&self) -> UnitOfWorkId {
        self.id
    }

    pub fn state(&self) -> UnitOfWorkState {
        self.state
    }

    /// Register a write to apply on commit (or discard on rollback).
    pub fn stage(&mut self, write: Box<dyn StagedWrite>) {
        self.staged.push(write);
    }

    /// Record the occurrence produced by a successful store write.
    pub fn record(&mut self, occurrence: MutationOccurrence) {
        self.occurrences.push(occurrence);
    }

    /// Occurrences recorded so far. Not yet visible to any notifier.
    pub fn occurrences(&self) -> &[MutationOccurrence] {
        &self.occurrences
    }

    /// Register a callback that runs only after this unit-of-work committed.
    ///
    /// The callback receives every occurrence recorded in the unit-of-work, in
    /// recording order. It never runs if the unit-of-work rolls back.
    pub fn after_commit<F>(&mut self, hook: F)
    where
        F: FnOnce(&[MutationOccurrence]) + Send + 'static,
    {
        self.hooks.push(Box::new(hook));
    }

    pub fn commit(mut self) -> CommitReceipt {
        let staged = std::mem::take(&mut self.staged);
        let occurrences = std::mem::take(&mut self.occurrences);
        let hooks = std::mem::take(&mut self.hooks);

        for write in &staged {
            write.apply();
        }
        self.state = UnitOfWorkState::Committed;

        for hook in hooks {
            hook(&occurrences);
        }

        for write in &staged {
            write.release();
        }

        info!(
            unit_of_work = %self.id,
            writes = staged.len(),
            occurrences = occurrences.len(),
            "unit of work committed"
        );

        CommitReceipt {
            unit_of_work_id: self.id,
            writes: staged.len(),
            occurrences: occurrences.len(),
        }
    }

    pub fn rollback(mut self) {
        self.discard_all();
    }

    fn discard_all(&mut self) {
        for write in self.staged.drain(..) {
            write.discard();
        }
        let dropped = self.occurrences.len();
        self.occurrences.clear();
        self.hooks.clear();
        self.state = UnitOfWorkState::RolledBack;

        debug!(
            unit_of_work = %self.id,
            dropped_occurrences = dropped,
            "unit of work rolled back"
        );
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.state == UnitOfWorkState::Active {
            self.discard_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use chrono::Utc;
    use fulfilment_core::BusinessUnitCode;
    use fulfilment_warehouses::{MutationKind, Warehouse};

    #[derive(Clone, Default)]
    struct Journal(Arc<Mutex<Vec<&'static str>>>);

    impl Journal {
        fn push(&self, entry: &'static str) {
            self.0.lock().unwrap().push(entry);
        }

        fn entries(&self) -> Vec<&'static str> {
            self.0.lock().unwrap().clone()
        }
    }

    struct JournalWrite(Journal);

    impl StagedWrite for JournalWrite {
        fn apply(&self) {
            self.0.push("apply");
        }

        fn release(&self) {
            self.0.push("release");
        }

        fn discard(&self) {
            self.0.push("discard");
        }
    }

    fn occurrence(uow: &UnitOfWork) -> MutationOccurrence {
        MutationOccurrence::new(
            uow.id(),
            MutationKind::Created,
            Warehouse {
                business_unit_code: BusinessUnitCode::parse("UOW-001").unwrap(),
                location: "ZWOLLE-001".to_string(),
                capacity: 10,
                stock: 0,
                created_at: Utc::now(),
                archived_at: None,
            },
            1,
            Utc::now(),
        )
    }

    #[test]
    fn commit_applies_then_runs_hooks_then_releases() {
        let journal = Journal::default();
        let mut uow = UnitOfWork::begin();
        uow.stage(Box::new(JournalWrite(journal.clone())));
        let occ = occurrence(&uow);
        uow.record(occ.clone());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let (hook_journal, hook_seen) = (journal.clone(), seen.clone());
        uow.after_commit(move |occurrences| {
            hook_journal.push("hook");
            hook_seen.lock().unwrap().extend_from_slice(occurrences);
        });

        let receipt = uow.commit();

        assert_eq!(journal.entries(), vec!["apply", "hook", "release"]);
        assert_eq!(*seen.lock().unwrap(), vec![occ]);
        assert_eq!(receipt.writes, 1);
        assert_eq!(receipt.occurrences, 1);
    }

    #[test]
    fn rollback_discards_and_never_runs_hooks() {
        let journal = Journal::default();
        let mut uow = UnitOfWork::begin();
        uow.stage(Box::new(JournalWrite(journal.clone())));
        let occ = occurrence(&uow);
        uow.record(occ);

        let hook_journal = journal.clone();
        uow.after_commit(move |_| hook_journal.push("hook"));

        uow.rollback();

        assert_eq!(journal.entries(), vec!["discard"]);
    }

    #[test]
    fn dropping_an_active_unit_of_work_rolls_back() {
        let journal = Journal::default();
        {
            let mut uow = UnitOfWork::begin();
            uow.stage(Box::new(JournalWrite(journal.clone())));
            let hook_journal = journal.clone();
            uow.after_commit(move |_| hook_journal.push("hook"));
        }
        assert_eq!(journal.entries(), vec!["discard"]);
    }

    #[test]
    fn committed_unit_of_work_does_not_discard_on_drop() {
        let journal = Journal::default();
        let mut uow = UnitOfWork::begin();
        uow.stage(Box::new(JournalWrite(journal.clone())));
        let _ = uow.commit();
        assert!(!journal.entries().contains(&"discard"));
    }
}
