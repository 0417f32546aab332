use txs_core::geo::GeoPoint;
use txs_core::ids::VehicleId;
use txs_core::movement::{Fare, Movement, VehicleStatus};
use txs_core::path::TrackPath;
use txs_core::time::Timestamp;

use crate::memory::MemoryStore;
use crate::sqlite::SqliteStore;
use crate::store::RouteStore;

fn ms(v: i64) -> Timestamp {
    Timestamp::from_millis(v)
}

fn movement(vehicle: u32, pickup_ms: i64, dropoff_ms: i64) -> Movement {
    let pickup_pos = GeoPoint::new(-73.98, 40.75);
    let dropoff_pos = GeoPoint::new(-73.96, 40.78);
    Movement {
        vehicle:         VehicleId(vehicle),
        pickup_time:     ms(pickup_ms),
        dropoff_time:    ms(dropoff_ms),
        status:          VehicleStatus::Occupied,
        passenger_count: 1,
        pickup_pos,
        dropoff_pos,
        distance_m:      pickup_pos.haversine_m(dropoff_pos),
        duration_secs:   (dropoff_ms - pickup_ms) as f64 / 1_000.0,
        fare: Fare {
            fare_amount:  9.0,
            extra:        0.0,
            mta_tax:      0.5,
            tip_amount:   1.5,
            tolls_amount: 0.0,
            surcharge:    0.3,
            total_amount: 11.3,
            payment_type: 1,
            trip_type:    1,
        },
        path: TrackPath::new(vec![
            pickup_pos,
            GeoPoint::new(-73.97, 40.76),
            dropoff_pos,
        ]),
    }
}

// Behavior shared by both backends.
mod contract {
    use super::*;

    fn window_overlap_is_half_open(store: &dyn RouteStore) {
        // One movement spanning [10s, 20s).
        let id = store.insert(&movement(0, 10_000, 20_000)).unwrap();

        // Window ending exactly at pickup: not yet visible.
        assert!(store.query_window(ms(0), ms(10_000), &[]).unwrap().is_empty());
        // Window starting exactly at dropoff: no longer visible.
        assert!(store.query_window(ms(20_000), ms(30_000), &[]).unwrap().is_empty());

        // Any overlap with the interior is visible.
        for (start, end) in [(0, 10_001), (15_000, 25_000), (19_999, 40_000), (0, 40_000)] {
            let hits = store.query_window(ms(start), ms(end), &[]).unwrap();
            assert_eq!(hits.len(), 1, "window [{start}, {end})");
            assert_eq!(hits[0].id, id);
        }
    }

    fn exclusions_are_honored(store: &dyn RouteStore) {
        let a = store.insert(&movement(0, 0, 10_000)).unwrap();
        let b = store.insert(&movement(1, 2_000, 12_000)).unwrap();
        let c = store.insert(&movement(2, 4_000, 14_000)).unwrap();

        let hits = store.query_window(ms(0), ms(20_000), &[a, c]).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, b);

        let hits = store.query_window(ms(0), ms(20_000), &[]).unwrap();
        assert_eq!(hits.iter().map(|h| h.id).collect::<Vec<_>>(), vec![a, b, c]);
    }

    fn results_are_ordered_by_pickup(store: &dyn RouteStore) {
        let late = store.insert(&movement(0, 8_000, 18_000)).unwrap();
        let early = store.insert(&movement(1, 1_000, 11_000)).unwrap();
        let mid = store.insert(&movement(2, 5_000, 15_000)).unwrap();

        let hits = store.query_window(ms(0), ms(20_000), &[]).unwrap();
        assert_eq!(
            hits.iter().map(|h| h.id).collect::<Vec<_>>(),
            vec![early, mid, late]
        );
    }

    fn count_tracks_inserts(store: &dyn RouteStore) {
        assert_eq!(store.count().unwrap(), 0);
        store.insert(&movement(0, 0, 1_000)).unwrap();
        store.insert(&movement(1, 0, 1_000)).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    mod memory {
        use super::*;

        #[test]
        fn window_overlap_is_half_open() {
            super::window_overlap_is_half_open(&MemoryStore::new());
        }

        #[test]
        fn exclusions_are_honored() {
            super::exclusions_are_honored(&MemoryStore::new());
        }

        #[test]
        fn results_are_ordered_by_pickup() {
            super::results_are_ordered_by_pickup(&MemoryStore::new());
        }

        #[test]
        fn count_tracks_inserts() {
            super::count_tracks_inserts(&MemoryStore::new());
        }
    }

    mod sqlite {
        use super::*;

        #[test]
        fn window_overlap_is_half_open() {
            super::window_overlap_is_half_open(&SqliteStore::open_in_memory().unwrap());
        }

        #[test]
        fn exclusions_are_honored() {
            super::exclusions_are_honored(&SqliteStore::open_in_memory().unwrap());
        }

        #[test]
        fn results_are_ordered_by_pickup() {
            super::results_are_ordered_by_pickup(&SqliteStore::open_in_memory().unwrap());
        }

        #[test]
        fn count_tracks_inserts() {
            super::count_tracks_inserts(&SqliteStore::open_in_memory().unwrap());
        }
    }
}

mod sqlite_roundtrip {
    use super::*;

    #[test]
    fn movement_survives_persistence_exactly() {
        let store = SqliteStore::open_in_memory().unwrap();
        let original = movement(42, 123_456, 654_321);

        let id = store.insert(&original).unwrap();
        let hits = store.query_window(ms(0), ms(1_000_000), &[]).unwrap();

        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id);
        assert_eq!(hits[0].movement, original);
    }

    #[test]
    fn free_movement_roundtrips_sentinel_fare() {
        let store = SqliteStore::open_in_memory().unwrap();
        let mut reposition = movement(7, 0, 5_000);
        reposition.status = VehicleStatus::Free;
        reposition.passenger_count = 0;
        reposition.fare = Fare::NONE;

        store.insert(&reposition).unwrap();
        let hits = store.query_window(ms(0), ms(10_000), &[]).unwrap();

        assert_eq!(hits[0].movement.status, VehicleStatus::Free);
        assert_eq!(hits[0].movement.fare, Fare::NONE);
    }

    #[test]
    fn ids_are_distinct_and_increasing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let a = store.insert(&movement(0, 0, 1_000)).unwrap();
        let b = store.insert(&movement(1, 0, 1_000)).unwrap();
        assert!(b > a);
    }
}
