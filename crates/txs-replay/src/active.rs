//! The active route set: movements currently relevant to the window.

use txs_core::ids::MovementId;
use txs_store::StoredMovement;
use txs_core::time::Timestamp;

/// One active movement plus its per-replay flags.
#[derive(Clone, Debug)]
pub struct ActiveRoute {
    pub stored:    StoredMovement,
    /// A reservation event has been emitted and not yet cleared by
    /// completion.
    pub reserved:  bool,
    /// Occupancy/Destination have been emitted for the pickup instant.
    pub announced: bool,
    /// RouteCompleted has been emitted for the dropoff instant.
    pub completed: bool,
}

impl ActiveRoute {
    fn new(stored: StoredMovement) -> Self {
        Self { stored, reserved: false, announced: false, completed: false }
    }
}

/// Insertion-ordered working set of active routes.
///
/// A route enters once (ids already present are never re-merged) and leaves
/// exactly once, on the first tick where its dropoff precedes the window
/// start.
#[derive(Default)]
pub struct ActiveRouteSet {
    routes: Vec<ActiveRoute>,
}

impl ActiveRouteSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Ids of every route currently in the set, for store-query exclusion.
    pub fn known_ids(&self) -> Vec<MovementId> {
        self.routes.iter().map(|r| r.stored.id).collect()
    }

    /// Append freshly queried routes, skipping ids already present.
    pub fn merge(&mut self, fresh: Vec<StoredMovement>) {
        for stored in fresh {
            if self.routes.iter().any(|r| r.stored.id == stored.id) {
                continue;
            }
            self.routes.push(ActiveRoute::new(stored));
        }
    }

    /// Drop every route whose dropoff precedes `window_start`.  Returns the
    /// number evicted.
    pub fn evict_before(&mut self, window_start: Timestamp) -> usize {
        let before = self.routes.len();
        self.routes
            .retain(|r| r.stored.movement.dropoff_time >= window_start);
        before - self.routes.len()
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ActiveRoute> {
        self.routes.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveRoute> {
        self.routes.iter_mut()
    }
}
