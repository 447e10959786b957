//! Commit-gated forwarding of warehouse mutations to the legacy system.
//!
//! Only occurrences from committed units-of-work ever reach the bus (see
//! [`crate::transactor`]), so everything the notifier sees is a committed fact.
//! Delivery is at-least-once and best-effort: a failed legacy call is logged
//! and counted, never retried and never propagated back to the mutation.

pub mod gateway;

pub use gateway::{LegacyGatewayError, LegacyWarehouseGateway, LoggingLegacyGateway};

use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use fulfilment_events::Event;
use fulfilment_warehouses::{MutationKind, MutationOccurrence};

/// Delivery counters.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct NotifierStats {
    pub delivered: u64,
    pub failed: u64,
}

#[derive(Debug)]
pub struct CommitGatedNotifier<G> {
    gateway: G,
    delivered: AtomicU64,
    failed: AtomicU64,
}

impl<G> CommitGatedNotifier<G>
where
    G: LegacyWarehouseGateway,
{
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Forward one committed occurrence. Returns whether the gateway accepted it.
    pub fn dispatch(&self, occurrence: &MutationOccurrence) -> bool {
        let warehouse = &occurrence.warehouse;
        let result = match occurrence.kind {
            MutationKind::Created => self.gateway.create_warehouse(warehouse),
            MutationKind::Updated => self.gateway.update_warehouse(warehouse),
        };

        match result {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
                debug!(
                    occurrence_id = %occurrence.occurrence_id,
                    event_type = occurrence.event_type(),
                    code = occurrence.subject(),
                    version = occurrence.version,
                    "mutation forwarded to legacy system"
                );
                true
            }
            Err(err) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    occurrence_id = %occurrence.occurrence_id,
                    event_type = occurrence.event_type(),
                    code = occurrence.subject(),
                    version = occurrence.version,
                    error = %err,
                    "legacy system sync failed; local state stays committed"
                );
                false
            }
        }
    }

    pub fn stats(&self) -> NotifierStats {
        NotifierStats {
            delivered: self.delivered.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}
