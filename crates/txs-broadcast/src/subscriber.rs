//! Subscriber transport seam and registry.
//!
//! The concrete transport (WebSocket, TCP, …) lives outside this crate;
//! it adapts its connection into a [`Subscriber`] and registers it here.
//! Registration hands back an opaque [`SubscriberId`] — identity never
//! depends on the transport handle itself.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use thiserror::Error;

use txs_core::ids::SubscriberId;

/// A single delivery failure.  Any failure drops the subscriber.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("subscriber connection closed")]
    Closed,

    #[error("transport error: {0}")]
    Io(String),
}

/// One delivery target.  Implementations must be cheap to call from the
/// broadcaster's consumer task; slow transports should buffer internally.
pub trait Subscriber: Send + Sync {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError>;

    /// Tear down the underlying transport.  Called exactly once, on removal.
    fn close(&self);
}

/// The set of currently connected subscribers.
///
/// Connect/disconnect run concurrently with fan-out; fan-out iterates a
/// [`snapshot`](SubscriberRegistry::snapshot) so membership changes never
/// invalidate an in-progress delivery pass.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<SubscriberId, Arc<dyn Subscriber>>>,
    next_id:     AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and allocate its id.  Ids are never reused
    /// within a process lifetime.
    pub fn add(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().insert(id, subscriber);
        id
    }

    /// Remove a subscriber and close its transport.  Removal wins exactly
    /// once: concurrent callers racing on the same id close nothing twice.
    pub fn remove(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().remove(&id);
        match removed {
            Some(subscriber) => {
                subscriber.close();
                true
            }
            None => false,
        }
    }

    /// A point-in-time copy of the membership for one delivery pass.
    pub fn snapshot(&self) -> Vec<(SubscriberId, Arc<dyn Subscriber>)> {
        self.subscribers
            .read()
            .iter()
            .map(|(id, s)| (*id, Arc::clone(s)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }
}
