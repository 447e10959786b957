//! Background workers.

pub mod notifier_worker;

pub use notifier_worker::{NotifierWorker, WorkerHandle};
