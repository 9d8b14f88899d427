/// file: src/events.rs
/// description: typed push events and the frame decoder for the dashboard feed
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Alert severity as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Medium,
    Warning,
    High,
    Critical,
}

/// One inbound push event. The wire discriminator is the `type` field; each
/// variant carries its kind-specific payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    MetricUpdate {
        device_id: String,
        cpu_usage_percent: f64,
        #[serde(default)]
        memory_usage_percent: Option<f64>,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    AlertNew {
        alert_id: String,
        #[serde(default)]
        device_id: Option<String>,
        #[serde(default)]
        severity: Option<Severity>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        timestamp: Option<DateTime<Utc>>,
    },
    AlertAck {
        alert_id: String,
    },
    AlertResolve {
        alert_id: String,
    },
    DeviceIsolated {
        device_id: String,
        #[serde(default)]
        reason: Option<String>,
    },
    DeviceReinstated {
        device_id: String,
    },
    RecoverySuccess {
        device_id: String,
        service_name: String,
    },
    RecoveryFailed {
        device_id: String,
        service_name: String,
        #[serde(default)]
        attempts: Option<u32>,
    },
}

/// Discriminator-only view of an [`Event`], used for subscription kind sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MetricUpdate,
    AlertNew,
    AlertAck,
    AlertResolve,
    DeviceIsolated,
    DeviceReinstated,
    RecoverySuccess,
    RecoveryFailed,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::MetricUpdate { .. } => EventKind::MetricUpdate,
            Event::AlertNew { .. } => EventKind::AlertNew,
            Event::AlertAck { .. } => EventKind::AlertAck,
            Event::AlertResolve { .. } => EventKind::AlertResolve,
            Event::DeviceIsolated { .. } => EventKind::DeviceIsolated,
            Event::DeviceReinstated { .. } => EventKind::DeviceReinstated,
            Event::RecoverySuccess { .. } => EventKind::RecoverySuccess,
            Event::RecoveryFailed { .. } => EventKind::RecoveryFailed,
        }
    }
}

/// Decodes one raw text frame into an [`Event`].
///
/// Malformed JSON and unrecognized discriminators both yield `None`: frames
/// from newer server versions are expected noise, never an error. Callers
/// must not mutate any consumer state when this returns `None`.
pub fn decode(raw: &str) -> Option<Event> {
    serde_json::from_str(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_metric_update() {
        let event = decode(
            r#"{"type":"metric_update","device_id":"d7","cpu_usage_percent":91.5,"memory_usage_percent":40.0}"#,
        )
        .unwrap();
        assert_eq!(event.kind(), EventKind::MetricUpdate);
        match event {
            Event::MetricUpdate {
                device_id,
                cpu_usage_percent,
                ..
            } => {
                assert_eq!(device_id, "d7");
                assert_eq!(cpu_usage_percent, 91.5);
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn decodes_alert_new_with_severity() {
        let event =
            decode(r#"{"type":"alert_new","alert_id":"a1","severity":"critical"}"#).unwrap();
        match event {
            Event::AlertNew {
                alert_id, severity, ..
            } => {
                assert_eq!(alert_id, "a1");
                assert_eq!(severity, Some(Severity::Critical));
            }
            other => panic!("wrong variant: {other:?}"),
        }
    }

    #[test]
    fn malformed_frame_is_dropped() {
        assert_eq!(decode("not json"), None);
    }

    #[test]
    fn unknown_discriminator_is_dropped() {
        assert_eq!(decode(r#"{"type":"unknown_kind"}"#), None);
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let event = decode(
            r#"{"type":"device_isolated","device_id":"d1","reason":"manual","operator":"ops@example"}"#,
        )
        .unwrap();
        assert_eq!(event.kind(), EventKind::DeviceIsolated);
    }

    #[test]
    fn missing_required_field_is_dropped() {
        // alert_ack without an alert_id is not a usable event
        assert_eq!(decode(r#"{"type":"alert_ack"}"#), None);
    }
}
