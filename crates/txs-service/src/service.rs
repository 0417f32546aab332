//! Service assembly and lifecycle.
//!
//! `StreamService` validates the configuration, then `start()` spawns the two
//! long-running tasks: the generator timer task and the broadcaster consumer.
//! Both select on a shared `watch` shutdown channel, so `ServiceHandle::
//! shutdown()` stops the whole pipeline and joins it cleanly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use txs_broadcast::{BroadcastHandle, Broadcaster, Subscriber, SubscriberRegistry};
use txs_core::config::StreamConfig;
use txs_core::error::CoreResult;
use txs_core::ids::SubscriberId;
use txs_core::movement::Movement;
use txs_core::rng::StreamRng;
use txs_dispatch::{DispatchSimulator, RouteResolver};
use txs_replay::TrackpointGenerator;
use txs_store::{RouteStore, StoreResult};

// Per-component seed offsets, mixed into the run seed so each component's
// RNG stream is independent but reproducible.
const DISPATCH_SEED_OFFSET: u64 = 1;
const REPLAY_SEED_OFFSET: u64 = 2;

/// The assembled but not yet running pipeline.
pub struct StreamService {
    config: StreamConfig,
    store:  Arc<dyn RouteStore>,
}

impl StreamService {
    /// Validate `config` and bind the pipeline to `store`.
    ///
    /// Configuration problems are the only fatal errors in the system, so
    /// they are rejected here, before anything is spawned.
    pub fn new(config: StreamConfig, store: Arc<dyn RouteStore>) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config, store })
    }

    #[inline]
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    #[inline]
    pub fn store(&self) -> Arc<dyn RouteStore> {
        Arc::clone(&self.store)
    }

    /// Build the ingestion-side dispatch simulator for this run.
    ///
    /// Dispatch runs synchronously inside whatever drives request ingestion;
    /// it shares the run seed so the whole pipeline is reproducible.
    pub fn dispatch_simulator<R: RouteResolver>(
        &self,
        resolver: R,
        seed: u64,
    ) -> DispatchSimulator<R> {
        let mut root = StreamRng::new(seed);
        DispatchSimulator::new(resolver, &self.config, root.child(DISPATCH_SEED_OFFSET))
    }

    /// Spawn the generator and broadcaster tasks and hand back the running
    /// pipeline's handle.
    pub fn start(self, seed: u64) -> ServiceHandle {
        let mut root = StreamRng::new(seed);
        let registry = Arc::new(SubscriberRegistry::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let (broadcaster, broadcast_join) =
            Broadcaster::spawn(&self.config, Arc::clone(&registry), shutdown_rx.clone());

        let generator = TrackpointGenerator::new(&self.config, root.child(REPLAY_SEED_OFFSET));
        let generator_join = tokio::spawn(generator_task(
            generator,
            Arc::clone(&self.store),
            broadcaster.clone(),
            self.config.window_size_secs,
            shutdown_rx,
        ));

        info!(
            fleet_size = self.config.fleet_size,
            target_rate = self.config.target_rate,
            "stream service started"
        );

        ServiceHandle {
            store: self.store,
            registry,
            broadcaster,
            shutdown: shutdown_tx,
            broadcast_join,
            generator_join,
        }
    }
}

/// Handle to the running pipeline.
pub struct ServiceHandle {
    store:          Arc<dyn RouteStore>,
    registry:       Arc<SubscriberRegistry>,
    broadcaster:    BroadcastHandle,
    shutdown:       watch::Sender<bool>,
    broadcast_join: JoinHandle<()>,
    generator_join: JoinHandle<()>,
}

impl ServiceHandle {
    /// Register a subscriber for event delivery.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) -> SubscriberId {
        self.registry.add(subscriber)
    }

    /// Remove a subscriber, closing its transport.  Returns `false` if it
    /// was already gone (e.g. dropped after a delivery failure).
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.registry.remove(id)
    }

    #[inline]
    pub fn subscriber_count(&self) -> usize {
        self.registry.len()
    }

    #[inline]
    pub fn store(&self) -> Arc<dyn RouteStore> {
        Arc::clone(&self.store)
    }

    /// Persist a dispatch result (a movement chain) for replay.
    pub fn record_movements(&self, movements: &[Movement]) -> StoreResult<()> {
        for movement in movements {
            self.store.insert(movement)?;
        }
        Ok(())
    }

    /// Signal shutdown and join both tasks.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.generator_join.await;
        let _ = self.broadcast_join.await;
        info!("stream service stopped");
    }
}

/// The generator timer task: tick on a fixed wall-clock period (first tick
/// immediate), enqueue every synthesized event, stop on shutdown.
async fn generator_task(
    mut generator: TrackpointGenerator,
    store: Arc<dyn RouteStore>,
    broadcaster: BroadcastHandle,
    period_secs: f64,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut timer = tokio::time::interval(Duration::from_secs_f64(period_secs));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(period_secs, "generator task started");
    loop {
        tokio::select! {
            _ = shutdown.changed() => break,
            _ = timer.tick() => {}
        }

        let events = match generator.tick(store.as_ref()) {
            Ok(events) => events,
            Err(err) => {
                // Recoverable: the window was left in place, so the same
                // span is retried on the next tick.
                warn!(error = %err, "generator tick failed; retrying next tick");
                continue;
            }
        };

        for event in events {
            if broadcaster.offer(event).await.is_err() {
                info!("broadcast queue closed; generator task stopping");
                return;
            }
        }
    }
    info!("generator task stopped");
}
