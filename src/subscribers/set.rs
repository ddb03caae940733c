//! # SubscriberSet: per-subscriber queues between the bus and slow consumers
//!
//! [`SubscriberSet`] hands each [`Event`] to every subscriber's own bounded
//! queue and returns immediately; the stream loop never waits on logging.
//!
//! ```text
//!   bus listener ──► emit(Event) ──► Arc<Event>
//!                                      ├──► [lane S1] ─► worker ─► on_event()
//!                                      └──► [lane SN] ─► worker ─► on_event()
//! ```
//!
//! - Events reach one subscriber in publish order.
//! - A full lane drops events for that subscriber only. The first drop of a
//!   burst is warned about; the burst size is reported once the lane drains.
//! - A panicking subscriber loses that one event and keeps its worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;

use super::Subscribe;

/// Delivery lane of one subscriber.
struct Lane {
    name: &'static str,
    tx: mpsc::Sender<Arc<Event>>,
    /// Events dropped since the last successful delivery.
    dropped: AtomicU64,
}

impl Lane {
    fn offer(&self, ev: Arc<Event>) {
        match self.tx.try_send(ev) {
            Ok(()) => {
                let missed = self.dropped.swap(0, Ordering::Relaxed);
                if missed > 0 {
                    tracing::warn!(subscriber = self.name, missed, "subscriber caught up");
                }
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
                    tracing::warn!(subscriber = self.name, "subscriber queue full, dropping events");
                }
            }
            // Worker is gone; nothing left to report to.
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }
}

/// Fan-out of runtime events to [`Subscribe`] implementations.
pub struct SubscriberSet {
    lanes: Vec<Lane>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Spawns one worker per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let (lanes, workers) = subs.into_iter().map(spawn_lane).unzip();
        Self { lanes, workers }
    }

    /// Queues `event` for every subscriber without waiting.
    pub fn emit(&self, event: Event) {
        let ev = Arc::new(event);
        for lane in &self.lanes {
            lane.offer(Arc::clone(&ev));
        }
    }

    /// Closes every lane and waits until the workers have drained them.
    pub async fn shutdown(self) {
        for lane in &self.lanes {
            let missed = lane.dropped.load(Ordering::Relaxed);
            if missed > 0 {
                tracing::warn!(subscriber = lane.name, missed, "events dropped before shutdown");
            }
        }
        drop(self.lanes);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

fn spawn_lane(sub: Arc<dyn Subscribe>) -> (Lane, JoinHandle<()>) {
    let name = sub.name();
    let (tx, mut rx) = mpsc::channel::<Arc<Event>>(sub.queue_capacity().max(1));

    let worker = tokio::spawn(async move {
        while let Some(ev) = rx.recv().await {
            let delivery = std::panic::AssertUnwindSafe(sub.on_event(&ev)).catch_unwind();
            if delivery.await.is_err() {
                tracing::error!(subscriber = name, seq = ev.seq, "subscriber panicked");
            }
        }
    });

    let lane = Lane {
        name,
        tx,
        dropped: AtomicU64::new(0),
    };
    (lane, worker)
}
