//! Publish/subscribe capabilities
//!
//! Components receive these as injected capabilities instead of extending a
//! middleware base type. Any transport (in-process, recorder, test double) can
//! provide them.

use std::sync::Arc;

use crate::{ContractError, Time};

/// Message callback type
///
/// Invoked once per delivered message, in delivery order.
/// Uses `Arc` to allow callback sharing across multiple contexts.
pub type MessageCallback<T> = Arc<dyn Fn(T) + Send + Sync>;

/// Outbound channel capability
///
/// `send` is fire-and-forget: the caller never observes delivery success.
/// Overflow, closed channels and shutdown are the transport's concern.
pub trait Publisher<T>: Send + Sync {
    /// Hand a message to the transport
    fn send(&self, message: T);
}

/// Inbound channel capability
pub trait Subscriber<T> {
    /// Register the callback that receives inbound messages
    ///
    /// # Errors
    /// Transport specific, e.g. a callback is already registered or the
    /// hosting context has been shut down.
    fn subscribe(&self, callback: MessageCallback<T>) -> Result<(), ContractError>;
}

/// Processing clock
pub trait Clock: Send + Sync {
    /// Current time
    fn now(&self) -> Time;
}

impl<T, P> Publisher<T> for Arc<P>
where
    P: Publisher<T> + ?Sized,
{
    fn send(&self, message: T) {
        (**self).send(message)
    }
}

impl<C> Clock for Arc<C>
where
    C: Clock + ?Sized,
{
    fn now(&self) -> Time {
        (**self).now()
    }
}
