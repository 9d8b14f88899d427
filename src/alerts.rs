/// file: src/alerts.rs
/// description: optimistic unread-alert badge counter
use crate::dispatch::EventDispatcher;
use crate::events::{Event, EventKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-local unread-alert count driven by push events.
///
/// Optimistic by design: `alert_new` bumps it, `alert_ack` and
/// `alert_resolve` decrement it, and it never reconciles against the REST
/// list total. The alerts page's own snapshot is the authoritative figure;
/// this exists only so the badge moves without a round trip.
#[derive(Debug, Clone, Default)]
pub struct AlertCounter {
    count: Arc<AtomicU64>,
}

impl AlertCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.count.load(Ordering::Acquire)
    }

    fn increment(&self) {
        self.count.fetch_add(1, Ordering::AcqRel);
    }

    // Saturates at zero: an ack for an alert we never counted must not
    // drive the badge negative.
    fn decrement(&self) {
        let _ = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                Some(n.saturating_sub(1))
            });
    }

    /// Registers this counter as a dispatcher consumer.
    pub fn attach(&self, dispatcher: &mut EventDispatcher) {
        let counter = self.clone();
        dispatcher.subscribe(
            &[
                EventKind::AlertNew,
                EventKind::AlertAck,
                EventKind::AlertResolve,
            ],
            move |event: &Event| match event.kind() {
                EventKind::AlertNew => counter.increment(),
                EventKind::AlertAck | EventKind::AlertResolve => counter.decrement(),
                _ => {}
            },
        );
    }
}
