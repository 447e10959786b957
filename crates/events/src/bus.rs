//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes messages that are already facts. For warehouse mutations
//! that means a message is published only after its unit-of-work committed; the
//! bus itself knows nothing about transactions.
//!
//! Delivery is **at-least-once** and best-effort. Consumers must tolerate
//! duplicates. Messages from one publisher arrive in publication order; there is
//! no ordering guarantee between concurrent publishers.

use std::sync::Arc;
use std::sync::mpsc::Receiver;
use std::time::Duration;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of every message published after it was created
/// (broadcast semantics). Intended for a single consuming thread.
///
/// ```ignore
/// let subscription = bus.subscribe();
/// loop {
///     match subscription.recv_timeout(Duration::from_millis(250)) {
///         Ok(message) => handle(message),
///         Err(std::sync::mpsc::RecvTimeoutError::Timeout) => continue, // check for shutdown
///         Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => break, // bus dropped
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Block for up to `timeout` waiting for a message.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<M, std::sync::mpsc::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything that is currently queued without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// ```text
/// versionedUpdate (staged) → commit → post-commit hook → EventBus::publish → NotifierWorker
/// ```
///
/// `publish()` can fail (e.g. the bus is unavailable). Publishers that run after
/// a durable commit must treat the failure as an observation, not as a reason to
/// undo the commit.
///
/// Implementations must be `Send + Sync`; multiple threads publish concurrently.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
