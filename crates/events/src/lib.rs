//! Event mechanics shared by domain and infrastructure crates.
//!
//! Domain crates describe what happened (`Event`); infrastructure decides how it
//! travels (`EventBus`).

pub mod bus;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
