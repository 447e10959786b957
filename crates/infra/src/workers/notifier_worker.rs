use std::io;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, info};

use fulfilment_events::{EventBus, Subscription};
use fulfilment_warehouses::MutationOccurrence;

use crate::notifier::{CommitGatedNotifier, LegacyWarehouseGateway};

/// Poll tick used when none is configured.
pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

/// Handle to control and join a background worker.
#[derive(Debug)]
pub struct WorkerHandle {
    name: &'static str,
    shutdown: mpsc::Sender<()>,
    join: Option<thread::JoinHandle<()>>,
}

impl WorkerHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Request graceful shutdown and wait for the worker to stop.
    ///
    /// Occurrences still queued on the subscription are not delivered.
    pub fn shutdown(mut self) {
        let _ = self.shutdown.send(());
        if let Some(j) = self.join.take() {
            let _ = j.join();
        }
    }
}

/// Background consumer that feeds committed occurrences to the notifier.
///
/// - Subscribes to the bus at spawn time (earlier occurrences are not seen)
/// - One thread, so occurrences are dispatched in bus order
/// - Gateway failures are absorbed by the notifier; the loop keeps going
#[derive(Debug)]
pub struct NotifierWorker;

impl NotifierWorker {
    pub fn spawn<B, G>(
        name: &'static str,
        bus: &B,
        notifier: Arc<CommitGatedNotifier<G>>,
    ) -> io::Result<WorkerHandle>
    where
        B: EventBus<MutationOccurrence>,
        G: LegacyWarehouseGateway + 'static,
    {
        Self::spawn_with_tick(name, bus, notifier, DEFAULT_TICK)
    }

    pub fn spawn_with_tick<B, G>(
        name: &'static str,
        bus: &B,
        notifier: Arc<CommitGatedNotifier<G>>,
        tick: Duration,
    ) -> io::Result<WorkerHandle>
    where
        B: EventBus<MutationOccurrence>,
        G: LegacyWarehouseGateway + 'static,
    {
        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let sub = bus.subscribe();

        let join = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || worker_loop(name, sub, shutdown_rx, &notifier, tick))?;

        info!(worker = name, tick_ms = tick.as_millis() as u64, "notifier worker started");

        Ok(WorkerHandle {
            name,
            shutdown: shutdown_tx,
            join: Some(join),
        })
    }
}

fn worker_loop<G>(
    name: &'static str,
    sub: Subscription<MutationOccurrence>,
    shutdown_rx: mpsc::Receiver<()>,
    notifier: &CommitGatedNotifier<G>,
    tick: Duration,
) where
    G: LegacyWarehouseGateway,
{
    loop {
        // Shutdown check (non-blocking)
        if shutdown_rx.try_recv().is_ok() {
            break;
        }

        match sub.recv_timeout(tick) {
            Ok(occurrence) => {
                notifier.dispatch(&occurrence);
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let stats = notifier.stats();
    debug!(
        worker = name,
        delivered = stats.delivered,
        failed = stats.failed,
        "notifier worker stopped"
    );
}
