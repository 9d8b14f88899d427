/// file: src/ui.rs
/// description: terminal status view consuming the live signals
use crate::alerts::AlertCounter;
use crate::connection::ConnectionState;
use crate::history::MetricHistory;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Minimal stand-in for the dashboard chrome: follows the connection-state
/// watch and periodically reports the badge count and metric window. Reads
/// only; all state is owned by the components it observes.
pub struct StatusView {
    state_rx: watch::Receiver<ConnectionState>,
    alert_counter: AlertCounter,
    metric_history: MetricHistory,
    interval: Duration,
}

impl StatusView {
    pub fn new(
        state_rx: watch::Receiver<ConnectionState>,
        alert_counter: AlertCounter,
        metric_history: MetricHistory,
        interval: Duration,
    ) -> Self {
        Self {
            state_rx,
            alert_counter,
            metric_history,
            interval,
        }
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                changed = self.state_rx.changed() => {
                    if changed.is_err() {
                        // connection manager gone; nothing left to show
                        break;
                    }
                    let state = *self.state_rx.borrow();
                    match state {
                        ConnectionState::Connected => info!("live feed connected"),
                        ConnectionState::Connecting => info!("live feed connecting..."),
                        ConnectionState::Disconnected => info!("live feed disconnected"),
                    }
                }
                _ = tokio::time::sleep(self.interval) => {
                    self.print_summary();
                }
            }
        }
    }

    fn print_summary(&self) {
        let latest = self.metric_history.latest();
        info!(
            unread_alerts = self.alert_counter.get(),
            window_len = self.metric_history.len(),
            latest_cpu = latest.map(|s| s.value),
            "live status"
        );
    }
}
