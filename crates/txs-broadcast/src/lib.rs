//! `txs-broadcast` — adaptive-rate fan-out of update events.
//!
//! One bounded queue, one consumer task.  The consumer paces itself toward
//! the configured target rate with a proportional backoff controller and
//! sheds position fixes under overload.  Subscribers register through the
//! shared [`SubscriberRegistry`]; a failed delivery removes the subscriber.

pub mod broadcaster;
pub mod pacing;
pub mod subscriber;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use broadcaster::{BroadcastHandle, Broadcaster, QueueClosed};
pub use pacing::{GapRing, PacingController};
pub use subscriber::{Subscriber, SubscriberRegistry, TransportError};
