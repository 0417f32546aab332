//! `txs-store` — persistence and windowed retrieval of movement records.
//!
//! The dispatch side inserts movements as requests resolve; the replay side
//! queries them back by simulated-time window.  Two backends: [`MemoryStore`]
//! and [`SqliteStore`], both behind the [`RouteStore`] trait.

pub mod error;
pub mod memory;
pub mod sqlite;
pub mod store;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use store::{RouteStore, StoredMovement};
