//! Composition root: wire policy, store, bus, service, search and notifier worker.

use std::io;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use fulfilment_events::InMemoryEventBus;
use fulfilment_warehouses::{MutationOccurrence, StaticLocationPolicy};

use crate::config::FulfilmentConfig;
use crate::notifier::{CommitGatedNotifier, LegacyWarehouseGateway, LoggingLegacyGateway};
use crate::search::WarehouseSearch;
use crate::store::InMemoryWarehouseStore;
use crate::transactor::Transactor;
use crate::use_cases::WarehouseService;
use crate::workers::{NotifierWorker, WorkerHandle};

pub type SharedStore = Arc<InMemoryWarehouseStore>;
pub type SharedPolicy = Arc<StaticLocationPolicy>;
pub type SharedBus = Arc<InMemoryEventBus<MutationOccurrence>>;
pub type Service = WarehouseService<SharedStore, SharedPolicy, SharedBus>;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to start notifier worker: {0}")]
    Worker(#[from] io::Error),
}

/// A running fulfilment core. Dropping it stops the notifier worker.
#[derive(Debug)]
pub struct FulfilmentRuntime<G> {
    pub service: Service,
    pub search: WarehouseSearch<SharedStore>,
    pub notifier: Arc<CommitGatedNotifier<G>>,
    pub bus: SharedBus,
    worker: Option<WorkerHandle>,
}

impl<G> FulfilmentRuntime<G> {
    /// Stop the notifier worker and wait for it.
    pub fn shutdown(mut self) {
        self.stop_worker();
    }

    fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            let name = worker.name();
            worker.shutdown();
            info!(worker = name, "notifier worker stopped");
        }
    }
}

impl<G> Drop for FulfilmentRuntime<G> {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

/// Start with the logging legacy gateway.
pub fn bootstrap(config: &FulfilmentConfig) -> Result<FulfilmentRuntime<LoggingLegacyGateway>, BootstrapError> {
    bootstrap_with_gateway(config, LoggingLegacyGateway)
}

pub fn bootstrap_with_gateway<G>(
    config: &FulfilmentConfig,
    gateway: G,
) -> Result<FulfilmentRuntime<G>, BootstrapError>
where
    G: LegacyWarehouseGateway + 'static,
{
    fulfilment_observability::init_with_filter(&config.log_filter);

    let policy: SharedPolicy = Arc::new(config.locations.clone());
    let store: SharedStore = InMemoryWarehouseStore::arc();
    let bus: SharedBus = Arc::new(InMemoryEventBus::new());

    let notifier = Arc::new(CommitGatedNotifier::new(gateway));
    // Subscribe before the first mutation can be published.
    let worker =
        NotifierWorker::spawn_with_tick("warehouse-notifier", &bus, notifier.clone(), config.notifier_tick)?;

    let service = WarehouseService::new(store.clone(), policy, Transactor::new(bus.clone()));
    let search = WarehouseSearch::new(store, config.page_limits);

    info!(
        locations = config.locations.len(),
        default_page_size = config.page_limits.default_page_size,
        max_page_size = config.page_limits.max_page_size,
        "fulfilment core started"
    );

    Ok(FulfilmentRuntime {
        service,
        search,
        notifier,
        bus,
        worker: Some(worker),
    })
}
