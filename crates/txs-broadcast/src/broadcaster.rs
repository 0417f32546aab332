//! The broadcaster: one consumer task draining the bounded event queue.
//!
//! Events are serialized once and fanned out to a snapshot of the registry.
//! A failed delivery drops that subscriber without blocking the others.
//! Under overload (queue above the shed threshold at dequeue time) position
//! fixes are discarded so status and completion events keep flowing.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use txs_core::config::StreamConfig;
use txs_core::event::UpdateEvent;

use crate::pacing::PacingController;
use crate::subscriber::SubscriberRegistry;

/// Fraction of queue capacity above which position fixes are shed.
const SHED_FRACTION: f64 = 0.95;

/// The producer side of the broadcast queue was closed.
#[derive(Debug, Error)]
#[error("broadcast queue closed")]
pub struct QueueClosed;

/// Producer handle: the generator enqueues through this.
#[derive(Clone)]
pub struct BroadcastHandle {
    tx: mpsc::Sender<UpdateEvent>,
}

impl BroadcastHandle {
    /// Enqueue one event, waiting while the queue is full (backpressure).
    pub async fn offer(&self, event: UpdateEvent) -> Result<(), QueueClosed> {
        self.tx.send(event).await.map_err(|_| QueueClosed)
    }
}

pub struct Broadcaster;

impl Broadcaster {
    /// Start the consumer task.  It exits when `shutdown` fires or every
    /// producer handle is dropped.
    pub fn spawn(
        config: &StreamConfig,
        registry: Arc<SubscriberRegistry>,
        shutdown: watch::Receiver<bool>,
    ) -> (BroadcastHandle, JoinHandle<()>) {
        let capacity = config.queue_capacity();
        let (tx, rx) = mpsc::channel(capacity);

        let worker = Worker {
            rx,
            registry,
            pacing: PacingController::new(config.target_rate, config.pacing_window),
            shed_threshold: shed_threshold(capacity),
            last_send: None,
        };
        let join = tokio::spawn(worker.run(shutdown));

        (BroadcastHandle { tx }, join)
    }
}

/// Queue occupancy above which position fixes are discarded.
pub(crate) fn shed_threshold(capacity: usize) -> usize {
    (capacity as f64 * SHED_FRACTION) as usize
}

/// The overload valve: shed only position fixes, only while the queue (as
/// observed before this dequeue) is above the threshold.
pub(crate) fn should_shed(occupancy: usize, threshold: usize, event: &UpdateEvent) -> bool {
    occupancy > threshold && event.is_location_update()
}

struct Worker {
    rx:             mpsc::Receiver<UpdateEvent>,
    registry:       Arc<SubscriberRegistry>,
    pacing:         PacingController,
    shed_threshold: usize,
    last_send:      Option<Instant>,
}

impl Worker {
    async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("broadcaster consumer started");
        loop {
            // Occupancy is observed before the dequeue so the shed decision
            // reflects the pressure this event arrived under.
            let occupancy = self.rx.len();

            let event = tokio::select! {
                _ = shutdown.changed() => {
                    debug!("broadcaster received shutdown");
                    break;
                }
                received = self.rx.recv() => match received {
                    Some(event) => event,
                    None => break,
                },
            };

            if should_shed(occupancy, self.shed_threshold, &event) {
                trace!(occupancy, "overload valve shed a position fix");
                continue;
            }

            self.deliver(&event);

            let now = Instant::now();
            if let Some(previous) = self.last_send.replace(now) {
                self.pacing
                    .record_send(now.duration_since(previous).as_secs_f64());
            }
            if self.rx.is_empty() {
                self.pacing.on_drained();
                // The idle period ahead is not an inter-send gap; the first
                // send of the next burst must start the measurement fresh.
                self.last_send = None;
            }

            let sleep = self.pacing.sleep_secs();
            if sleep > 0.0 {
                tokio::time::sleep(Duration::from_secs_f64(sleep)).await;
            }
        }
        info!("broadcaster consumer stopped");
    }

    /// Serialize once, fan out to a membership snapshot, drop failures.
    fn deliver(&self, event: &UpdateEvent) {
        let payload = match serde_json::to_vec(event) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "event serialization failed; event skipped");
                return;
            }
        };

        for (id, subscriber) in self.registry.snapshot() {
            if let Err(err) = subscriber.send(&payload) {
                warn!(subscriber = %id, error = %err, "delivery failed; removing subscriber");
                self.registry.remove(id);
            }
        }
    }
}
