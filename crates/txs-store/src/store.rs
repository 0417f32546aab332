//! The `RouteStore` trait and its record type.

use txs_core::ids::MovementId;
use txs_core::movement::Movement;
use txs_core::time::Timestamp;

use crate::error::StoreResult;

/// A persisted movement together with its store-assigned identifier.
#[derive(Clone, Debug, PartialEq)]
pub struct StoredMovement {
    pub id:       MovementId,
    pub movement: Movement,
}

/// Persistence and retrieval of movement records.
///
/// Implementations take `&self` and must be safe to share between the
/// dispatch side (inserting) and the replay side (querying) concurrently.
pub trait RouteStore: Send + Sync {
    /// Persist one movement and return its assigned identifier.
    fn insert(&self, movement: &Movement) -> StoreResult<MovementId>;

    /// All movements overlapping the half-open window `[start, end)` —
    /// that is, `dropoff_time > start && pickup_time < end` — excluding the
    /// given already-known identifiers.  Ordered by pickup time, then id.
    fn query_window(
        &self,
        start: Timestamp,
        end: Timestamp,
        exclude: &[MovementId],
    ) -> StoreResult<Vec<StoredMovement>>;

    /// Total number of persisted movements.
    fn count(&self) -> StoreResult<u64>;
}
