/// file: src/dispatch.rs
/// description: decodes raw frames and fans typed events out to local consumers
use crate::events::{Event, EventKind, decode};
use tokio::sync::mpsc;
use tracing::trace;

// Bounded so a burst of push traffic cannot grow memory without limit. The
// dispatcher drains synchronously, so the buffer only absorbs scheduling lag.
const FRAME_CHANNEL_CAPACITY: usize = 1_024;

pub type FrameSender = mpsc::Sender<String>;
pub type FrameReceiver = mpsc::Receiver<String>;

/// Channel carrying raw text frames from the connection to the dispatcher.
pub fn frame_channel() -> (FrameSender, FrameReceiver) {
    mpsc::channel(FRAME_CHANNEL_CAPACITY)
}

type EventCallback = Box<dyn FnMut(&Event) + Send>;

struct Subscription {
    kinds: Vec<EventKind>,
    callback: EventCallback,
}

/// Explicit publish/subscribe hub for decoded events.
///
/// Consumers register a kind set and a callback; each decoded event fans out
/// synchronously, in registration order, to every subscription whose kind set
/// matches. Frames that fail to decode reach no consumer and mutate nothing.
#[derive(Default)]
pub struct EventDispatcher {
    subscriptions: Vec<Subscription>,
    last_event: Option<Event>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for every event whose kind appears in `kinds`.
    pub fn subscribe<F>(&mut self, kinds: &[EventKind], callback: F)
    where
        F: FnMut(&Event) + Send + 'static,
    {
        self.subscriptions.push(Subscription {
            kinds: kinds.to_vec(),
            callback: Box::new(callback),
        });
    }

    /// Decodes one raw frame and fans it out. Returns the decoded kind, or
    /// `None` for frames that were dropped as noise.
    pub fn dispatch(&mut self, raw: &str) -> Option<EventKind> {
        let Some(event) = decode(raw) else {
            trace!(frame = %raw.chars().take(100).collect::<String>(), "dropped undecodable frame");
            crate::monitoring::FRAMES_DROPPED_COUNTER.increment(1);
            return None;
        };

        let kind = event.kind();
        for sub in &mut self.subscriptions {
            if sub.kinds.contains(&kind) {
                (sub.callback)(&event);
            }
        }
        self.last_event = Some(event);
        crate::monitoring::EVENTS_DISPATCHED_COUNTER.increment(1);
        Some(kind)
    }

    /// Most recent successfully decoded event, if any.
    pub fn last_event(&self) -> Option<&Event> {
        self.last_event.as_ref()
    }

    /// Drains the frame channel until the connection side hangs up.
    pub async fn run(mut self, mut frames: FrameReceiver) {
        while let Some(raw) = frames.recv().await {
            self.dispatch(&raw);
        }
        trace!("frame channel closed, dispatcher exiting");
    }
}
