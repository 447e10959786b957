//! Transaction runner: the seam between unit-of-work and event bus.
//!
//! ```text
//! Transactor::run(work)
//!   ↓
//! 1. begin unit-of-work, register the publishing hook
//!   ↓
//! 2. work(&mut uow)            store writes are staged, occurrences recorded
//!   ↓
//! 3. Ok  → commit → hook publishes occurrences to the bus
//!    Err → rollback → occurrences are dropped unseen
//! ```
//!
//! Publication happens after the commit; a failing bus is logged and never
//! undoes or fails the commit.

use tracing::warn;

use fulfilment_events::{Event, EventBus};
use fulfilment_warehouses::MutationOccurrence;

use crate::unit_of_work::UnitOfWork;

#[derive(Debug, Clone)]
pub struct Transactor<B> {
    bus: B,
}

impl<B> Transactor<B>
where
    B: EventBus<MutationOccurrence> + Clone + 'static,
{
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Begin a unit-of-work whose occurrences are published to the bus on commit.
    pub fn begin(&self) -> UnitOfWork {
        let mut uow = UnitOfWork::begin();
        let bus = self.bus.clone();
        uow.after_commit(move |occurrences| publish_all(&bus, occurrences));
        uow
    }

    /// Run `work` inside a fresh unit-of-work: commit on `Ok`, roll back on `Err`.
    pub fn run<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut UnitOfWork) -> Result<T, E>,
    {
        let mut uow = self.begin();
        match work(&mut uow) {
            Ok(value) => {
                uow.commit();
                Ok(value)
            }
            Err(err) => {
                uow.rollback();
                Err(err)
            }
        }
    }
}

fn publish_all<B>(bus: &B, occurrences: &[MutationOccurrence])
where
    B: EventBus<MutationOccurrence>,
{
    for occurrence in occurrences {
        if let Err(err) = bus.publish(occurrence.clone()) {
            warn!(
                occurrence_id = %occurrence.occurrence_id,
                event_type = occurrence.event_type(),
                code = occurrence.subject(),
                error = ?err,
                "failed to publish committed mutation occurrence"
            );
        }
    }
}
