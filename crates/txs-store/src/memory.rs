//! In-memory store backend, used in tests and for self-contained runs.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use txs_core::ids::MovementId;
use txs_core::movement::Movement;
use txs_core::time::Timestamp;

use crate::error::StoreResult;
use crate::store::{RouteStore, StoredMovement};

/// A `RouteStore` holding everything in a `Vec` behind a read-write lock.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<StoredMovement>>,
    next_id: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RouteStore for MemoryStore {
    fn insert(&self, movement: &Movement) -> StoreResult<MovementId> {
        let id = MovementId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.records.write().push(StoredMovement {
            id,
            movement: movement.clone(),
        });
        Ok(id)
    }

    fn query_window(
        &self,
        start: Timestamp,
        end: Timestamp,
        exclude: &[MovementId],
    ) -> StoreResult<Vec<StoredMovement>> {
        let records = self.records.read();
        let mut hits: Vec<StoredMovement> = records
            .iter()
            .filter(|r| {
                r.movement.dropoff_time > start
                    && r.movement.pickup_time < end
                    && !exclude.contains(&r.id)
            })
            .cloned()
            .collect();
        hits.sort_by_key(|r| (r.movement.pickup_time, r.id));
        Ok(hits)
    }

    fn count(&self) -> StoreResult<u64> {
        Ok(self.records.read().len() as u64)
    }
}
