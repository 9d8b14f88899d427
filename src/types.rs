/// file: src/types.rs
/// description: data models for the REST collaborator endpoints
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Paginated list response shared by every collection endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub items: Vec<T>,
}

/// A monitored host as the devices endpoint reports it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: Uuid,
    pub hostname: String,
    pub ip_address: String,
    pub device_type: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub os_type: Option<String>,
    pub is_active: bool,
    pub is_isolated: bool,
    #[serde(default)]
    pub isolation_reason: Option<String>,
    #[serde(default)]
    pub isolated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// An alert record from the alerts endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub device_id: Uuid,
    pub alert_type: String,
    pub severity: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub metric_value: Option<f64>,
    pub is_acknowledged: bool,
    #[serde(default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub is_resolved: bool,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Per-device aggregate from the metrics-summary snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceMetricsSummary {
    pub device_id: Uuid,
    #[serde(default)]
    pub avg_cpu_percent: Option<f64>,
    #[serde(default)]
    pub avg_ram_percent: Option<f64>,
    #[serde(default)]
    pub max_temperature_celsius: Option<f64>,
    #[serde(default)]
    pub sample_count: Option<u64>,
}
