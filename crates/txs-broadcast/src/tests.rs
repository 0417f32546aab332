use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;

use txs_core::config::StreamConfig;
use txs_core::event::UpdateEvent;
use txs_core::ids::VehicleId;

use crate::broadcaster::{Broadcaster, shed_threshold, should_shed};
use crate::pacing::{GapRing, PacingController};
use crate::subscriber::{Subscriber, SubscriberRegistry, TransportError};

fn occupancy_event(vehicle: u32) -> UpdateEvent {
    UpdateEvent::Occupancy { vehicle_id: VehicleId(vehicle), passenger_count: 1 }
}

fn location_event(vehicle: u32) -> UpdateEvent {
    UpdateEvent::LocationUpdate {
        vehicle_id: VehicleId(vehicle),
        lon: -73.98,
        lat: 40.75,
        passenger_count: 0,
        dest_lon: None,
        dest_lat: None,
        reservation_lon: None,
        reservation_lat: None,
    }
}

#[derive(Default)]
struct CollectingSubscriber {
    payloads: Mutex<Vec<Vec<u8>>>,
    closes:   AtomicUsize,
}

impl CollectingSubscriber {
    fn received(&self) -> Vec<UpdateEvent> {
        self.payloads
            .lock()
            .iter()
            .map(|p| serde_json::from_slice(p).unwrap())
            .collect()
    }
}

impl Subscriber for CollectingSubscriber {
    fn send(&self, payload: &[u8]) -> Result<(), TransportError> {
        self.payloads.lock().push(payload.to_vec());
        Ok(())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Records the (mock) wall-clock instant of every delivery.
#[derive(Default)]
struct TimingSubscriber {
    sends: Mutex<Vec<tokio::time::Instant>>,
}

impl Subscriber for TimingSubscriber {
    fn send(&self, _payload: &[u8]) -> Result<(), TransportError> {
        self.sends.lock().push(tokio::time::Instant::now());
        Ok(())
    }

    fn close(&self) {}
}

#[derive(Default)]
struct FailingSubscriber {
    closes: AtomicUsize,
}

impl Subscriber for FailingSubscriber {
    fn send(&self, _payload: &[u8]) -> Result<(), TransportError> {
        Err(TransportError::Io("connection reset".into()))
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

mod ring {
    use super::*;

    #[test]
    fn mean_over_partial_fill() {
        let mut ring = GapRing::new(4);
        assert_eq!(ring.mean(), None);

        ring.record(0.1);
        ring.record(0.3);
        assert_eq!(ring.len(), 2);
        assert!((ring.mean().unwrap() - 0.2).abs() < 1e-12);
    }

    #[test]
    fn full_ring_overwrites_the_oldest() {
        let mut ring = GapRing::new(3);
        for gap in [1.0, 2.0, 3.0, 4.0] {
            ring.record(gap);
        }
        // 1.0 was overwritten; live values are {4.0, 2.0, 3.0}.
        assert_eq!(ring.len(), 3);
        assert!((ring.mean().unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn clear_resets_in_place() {
        let mut ring = GapRing::new(3);
        ring.record(1.0);
        ring.record(2.0);

        ring.clear();

        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 3);
        assert_eq!(ring.mean(), None);

        ring.record(5.0);
        assert!((ring.mean().unwrap() - 5.0).abs() < 1e-12);
    }
}

mod pacing {
    use super::*;

    const TARGET: f64 = 500.0;
    const PERIOD: f64 = 1.0 / TARGET;

    #[test]
    fn starts_at_the_target_period() {
        let pacing = PacingController::new(TARGET, 100);
        assert!((pacing.sleep_secs() - PERIOD).abs() < 1e-12);
    }

    #[test]
    fn target_gap_is_a_fixed_point() {
        let mut pacing = PacingController::new(TARGET, 100);
        for _ in 0..50 {
            pacing.record_send(PERIOD);
            assert!((pacing.sleep_secs() - PERIOD).abs() < 1e-9);
        }
    }

    #[test]
    fn converges_back_after_a_disturbance() {
        let mut pacing = PacingController::new(TARGET, 100);
        pacing.record_send(0.05); // one slow send, 25× the period

        // With zero processing time the observed gap equals the sleep.
        for _ in 0..20 {
            let gap = pacing.sleep_secs();
            assert!(gap >= 0.0);
            pacing.record_send(gap);
        }
        assert!(
            (pacing.sleep_secs() - PERIOD).abs() < 1e-6,
            "backoff {} did not converge to {PERIOD}",
            pacing.sleep_secs()
        );
    }

    #[test]
    fn drain_resets_backoff_and_history() {
        let mut pacing = PacingController::new(TARGET, 100);
        pacing.record_send(0.5);
        pacing.record_send(0.7);

        pacing.on_drained();

        assert!((pacing.sleep_secs() - PERIOD).abs() < 1e-12);
        assert_eq!(pacing.measured_rate(), None);
    }

    #[test]
    fn measured_rate_inverts_the_mean_gap() {
        let mut pacing = PacingController::new(TARGET, 100);
        for _ in 0..10 {
            pacing.record_send(0.002);
        }
        assert!((pacing.measured_rate().unwrap() - 500.0).abs() < 1e-6);
    }
}

mod valve {
    use super::*;

    #[test]
    fn sheds_position_fixes_above_the_threshold() {
        let threshold = shed_threshold(100);
        assert_eq!(threshold, 95);

        // Queue at 96% and a position fix: shed.
        assert!(should_shed(96, threshold, &location_event(0)));
        // Same pressure but a status event: delivered.
        assert!(!should_shed(96, threshold, &occupancy_event(0)));
        // At (not above) the threshold: delivered.
        assert!(!should_shed(95, threshold, &location_event(0)));
    }
}

mod registry {
    use super::*;

    #[test]
    fn ids_are_opaque_and_never_reused() {
        let registry = SubscriberRegistry::new();
        let a = registry.add(Arc::new(CollectingSubscriber::default()));
        let b = registry.add(Arc::new(CollectingSubscriber::default()));
        assert_ne!(a, b);

        registry.remove(a);
        let c = registry.add(Arc::new(CollectingSubscriber::default()));
        assert_ne!(c, a);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn remove_closes_the_transport_exactly_once() {
        let registry = SubscriberRegistry::new();
        let subscriber = Arc::new(CollectingSubscriber::default());
        let id = registry.add(subscriber.clone());

        assert!(registry.remove(id));
        assert!(!registry.remove(id));
        assert_eq!(subscriber.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn snapshot_is_isolated_from_later_changes() {
        let registry = SubscriberRegistry::new();
        registry.add(Arc::new(CollectingSubscriber::default()));

        let snapshot = registry.snapshot();
        registry.add(Arc::new(CollectingSubscriber::default()));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 2);
    }
}

mod delivery {
    use super::*;

    fn test_config() -> StreamConfig {
        StreamConfig {
            target_rate: 100.0,
            window_size_secs: 1.0,
            ..StreamConfig::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn events_reach_every_subscriber() {
        let registry = Arc::new(SubscriberRegistry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, join) = Broadcaster::spawn(&test_config(), registry.clone(), shutdown_rx);

        let first = Arc::new(CollectingSubscriber::default());
        let second = Arc::new(CollectingSubscriber::default());
        registry.add(first.clone());
        registry.add(second.clone());

        let events = [occupancy_event(1), location_event(2), occupancy_event(3)];
        for event in &events {
            handle.offer(event.clone()).await.unwrap();
        }
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;

        shutdown_tx.send(true).unwrap();
        join.await.unwrap();

        assert_eq!(first.received(), events);
        assert_eq!(second.received(), events);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_delivery_removes_only_that_subscriber() {
        let registry = Arc::new(SubscriberRegistry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, join) = Broadcaster::spawn(&test_config(), registry.clone(), shutdown_rx);

        let healthy = Arc::new(CollectingSubscriber::default());
        let broken = Arc::new(FailingSubscriber::default());
        registry.add(healthy.clone());
        registry.add(broken.clone());

        handle.offer(occupancy_event(1)).await.unwrap();
        handle.offer(occupancy_event(2)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;

        shutdown_tx.send(true).unwrap();
        join.await.unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(broken.closes.load(Ordering::SeqCst), 1);
        assert_eq!(healthy.received().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_after_an_idle_drain_are_still_paced() {
        // target_rate 10/s → period 0.1 s.
        let config = StreamConfig {
            target_rate: 10.0,
            window_size_secs: 1.0,
            ..StreamConfig::default()
        };
        let registry = Arc::new(SubscriberRegistry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, join) = Broadcaster::spawn(&config, registry.clone(), shutdown_rx);

        let timing = Arc::new(TimingSubscriber::default());
        registry.add(timing.clone());

        // One event, then let the queue drain and sit idle well past the
        // target period.
        handle.offer(occupancy_event(0)).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;

        // A burst after the idle period: the idle gap must not be measured,
        // so these deliveries stay one target period apart.
        for vehicle in 1..=4 {
            handle.offer(occupancy_event(vehicle)).await.unwrap();
        }
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;

        shutdown_tx.send(true).unwrap();
        join.await.unwrap();

        let sends = timing.sends.lock().clone();
        assert_eq!(sends.len(), 5);
        for pair in sends[1..].windows(2) {
            let gap = pair[1].duration_since(pair[0]).as_secs_f64();
            assert!(
                (0.09..=0.2).contains(&gap),
                "intra-burst gap {gap}s, expected ~0.1s"
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn offers_fail_once_the_consumer_has_stopped() {
        let registry = Arc::new(SubscriberRegistry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (handle, join) = Broadcaster::spawn(&test_config(), registry, shutdown_rx);

        shutdown_tx.send(true).unwrap();
        join.await.unwrap();

        assert!(handle.offer(occupancy_event(1)).await.is_err());
    }
}
