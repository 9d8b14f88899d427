// file: src/api.rs
// description: REST collaborator client for authoritative snapshots and actions

use crate::creds::CredentialProvider;
use crate::error::FleetwatchError;
use crate::refetch::{FetchRequest, SnapshotFetcher};
use crate::types::{Alert, Device, DeviceMetricsSummary, Page};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

/// Thin client over the dashboard's REST API. Snapshot fetches through this
/// client are the source of truth for list contents; the push feed only
/// signals that a refetch is worthwhile.
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    creds: Arc<dyn CredentialProvider>,
}

impl RestClient {
    pub fn new(
        base_url: Url,
        creds: Arc<dyn CredentialProvider>,
    ) -> Result<Self, FleetwatchError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url,
            creds,
        })
    }

    fn request(
        &self,
        method: Method,
        path: &str,
    ) -> Result<reqwest::RequestBuilder, FleetwatchError> {
        let url = self.base_url.join(path)?;
        let mut req = self.http.request(method, url);
        if let Some(token) = self.creds.token() {
            req = req.bearer_auth(token);
        }
        Ok(req)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> Result<T, FleetwatchError> {
        let resp = self.request(Method::GET, path)?.query(query).send().await?;
        if !resp.status().is_success() {
            return Err(FleetwatchError::SnapshotStatus(resp.status()));
        }
        Ok(resp.json().await?)
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, FleetwatchError> {
        let resp = self.request(Method::POST, path)?.json(body).send().await?;
        if !resp.status().is_success() {
            return Err(FleetwatchError::SnapshotStatus(resp.status()));
        }
        Ok(resp.json().await?)
    }

    pub async fn list_devices(
        &self,
        request: &FetchRequest,
    ) -> Result<Page<Device>, FleetwatchError> {
        self.get_json("devices", &list_query(request)).await
    }

    pub async fn list_alerts(
        &self,
        request: &FetchRequest,
    ) -> Result<Page<Alert>, FleetwatchError> {
        self.get_json("alerts", &list_query(request)).await
    }

    pub async fn metrics_summary(&self) -> Result<Vec<DeviceMetricsSummary>, FleetwatchError> {
        self.get_json("metrics/summary", &[]).await
    }

    pub async fn acknowledge_alert(
        &self,
        alert_id: Uuid,
        note: Option<&str>,
    ) -> Result<Alert, FleetwatchError> {
        self.post_json(
            &format!("alerts/{alert_id}/acknowledge"),
            &serde_json::json!({ "note": note }),
        )
        .await
    }

    pub async fn resolve_alert(&self, alert_id: Uuid) -> Result<Alert, FleetwatchError> {
        self.post_json(&format!("alerts/{alert_id}/resolve"), &serde_json::json!({}))
            .await
    }

    pub async fn isolate_device(
        &self,
        device_id: Uuid,
        reason: &str,
    ) -> Result<Device, FleetwatchError> {
        self.post_json(
            &format!("devices/{device_id}/isolate"),
            &serde_json::json!({ "reason": reason }),
        )
        .await
    }

    pub async fn reinstate_device(&self, device_id: Uuid) -> Result<Device, FleetwatchError> {
        self.post_json(
            &format!("devices/{device_id}/unisolate"),
            &serde_json::json!({}),
        )
        .await
    }
}

fn list_query(request: &FetchRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", request.page.to_string()),
        ("page_size", request.limit.to_string()),
    ];
    if let Some(search) = &request.filters.search {
        query.push(("search", search.clone()));
    }
    if let Some(status) = &request.filters.status {
        query.push(("status", status.clone()));
    }
    if let Some(severity) = &request.filters.severity {
        query.push(("severity", severity.clone()));
    }
    query
}

/// Snapshot source for the devices page.
pub struct DeviceListFetcher {
    client: Arc<RestClient>,
}

impl DeviceListFetcher {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnapshotFetcher<Device> for DeviceListFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Page<Device>, FleetwatchError> {
        self.client.list_devices(request).await
    }
}

/// Snapshot source for the alerts page.
pub struct AlertListFetcher {
    client: Arc<RestClient>,
}

impl AlertListFetcher {
    pub fn new(client: Arc<RestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SnapshotFetcher<Alert> for AlertListFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<Page<Alert>, FleetwatchError> {
        self.client.list_alerts(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refetch::Filters;

    #[test]
    fn list_query_carries_pagination_and_set_filters_only() {
        let request = FetchRequest {
            filters: Filters {
                search: None,
                status: Some("active".into()),
                severity: Some("critical".into()),
            },
            page: 3,
            limit: 50,
        };

        let query = list_query(&request);
        assert_eq!(
            query,
            vec![
                ("page", "3".to_string()),
                ("page_size", "50".to_string()),
                ("status", "active".to_string()),
                ("severity", "critical".to_string()),
            ]
        );
    }

    #[test]
    fn collection_paths_join_against_a_versioned_base() {
        let base = Url::parse("https://fleet.example/api/v1/").unwrap();
        assert_eq!(
            base.join("alerts").unwrap().as_str(),
            "https://fleet.example/api/v1/alerts"
        );
        assert_eq!(
            base.join("metrics/summary").unwrap().as_str(),
            "https://fleet.example/api/v1/metrics/summary"
        );
    }
}
