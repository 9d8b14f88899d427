/// file: src/history.rs
/// description: fixed-capacity metric history window for the live chart
use crate::dispatch::EventDispatcher;
use crate::events::{Event, EventKind};
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Samples retained for the live chart. Oldest drop off the front.
pub const METRIC_WINDOW_CAPACITY: usize = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

/// Time-ordered window of one numeric series, capacity
/// [`METRIC_WINDOW_CAPACITY`], newest last.
///
/// Samples are stamped at arrival. Gaps in delivery are not interpolated;
/// the visible window simply compresses.
#[derive(Debug, Clone, Default)]
pub struct MetricHistory {
    window: Arc<Mutex<VecDeque<MetricSample>>>,
}

impl MetricHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, value: f64) {
        self.push_at(Utc::now(), value);
    }

    fn push_at(&self, timestamp: DateTime<Utc>, value: f64) {
        let mut window = self.window.lock().unwrap_or_else(|e| e.into_inner());
        window.push_back(MetricSample { timestamp, value });
        while window.len() > METRIC_WINDOW_CAPACITY {
            window.pop_front();
        }
    }

    /// Current window, oldest first.
    pub fn window(&self) -> Vec<MetricSample> {
        self.window
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.window.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn latest(&self) -> Option<MetricSample> {
        self.window
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .back()
            .cloned()
    }

    /// Registers this window as a dispatcher consumer of metric ticks.
    pub fn attach(&self, dispatcher: &mut EventDispatcher) {
        let history = self.clone();
        dispatcher.subscribe(&[EventKind::MetricUpdate], move |event: &Event| {
            if let Event::MetricUpdate {
                cpu_usage_percent, ..
            } = event
            {
                history.push(*cpu_usage_percent);
            }
        });
    }
}
