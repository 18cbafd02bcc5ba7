//! Statistics service client
//!
//! Records event views and reads back hit counts from the external
//! statistics service. Callers on read paths treat every failure here as
//! non-fatal.

use std::collections::HashMap;
use std::time::Duration;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;
use crate::config::StatsConfig;
use crate::utils::errors::{EwmError, Result, StatsError, StatsResult};
use crate::utils::helpers::{event_id_from_uri, event_uri, format_stats_timestamp};

/// Body of `POST /hit`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HitRequest {
    pub app: String,
    pub uri: String,
    pub ip: String,
    pub timestamp: String,
}

/// One row of `GET /stats`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ViewStats {
    pub app: String,
    pub uri: String,
    pub hits: i64,
}

#[derive(Clone)]
#[derive(Debug)]
pub struct StatsClient {
    client: Client,
    base_url: Url,
    app_name: String,
    enabled: bool,
}

impl StatsClient {
    /// Create a new StatsClient instance
    pub fn new(config: &StatsConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("ExploreWithMe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(EwmError::Http)?;

        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            app_name: config.app_name.clone(),
            enabled: config.enabled,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    fn endpoint(&self, path: &str) -> StatsResult<Url> {
        if !self.enabled {
            return Err(StatsError::Disabled);
        }
        self.base_url
            .join(path)
            .map_err(|e| StatsError::RequestFailed(e.to_string()))
    }

    /// Record one view of `uri` by `client_ip`
    pub async fn record_hit(&self, uri: &str, client_ip: &str, timestamp: DateTime<Utc>) -> StatsResult<()> {
        let url = self.endpoint("hit")?;
        let body = HitRequest {
            app: self.app_name.clone(),
            uri: uri.to_string(),
            ip: client_ip.to_string(),
            timestamp: format_stats_timestamp(timestamp),
        };

        debug!(uri = uri, ip = client_ip, "Recording hit");

        let response = self.client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StatsError::RequestFailed(format!("HTTP {}: {}", status, error_text)));
        }

        Ok(())
    }

    /// Hit counts for `uris` between `start` and `end`
    pub async fn query_hits(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        uris: &[String],
        unique: bool,
    ) -> StatsResult<Vec<ViewStats>> {
        let url = self.endpoint("stats")?;

        let mut query: Vec<(&str, String)> = vec![
            ("start", format_stats_timestamp(start)),
            ("end", format_stats_timestamp(end)),
        ];
        query.extend(uris.iter().map(|uri| ("uris", uri.clone())));
        query.push(("unique", unique.to_string()));

        debug!(uris = uris.len(), unique = unique, "Querying hit counts");

        let response = self.client
            .get(url)
            .query(&query)
            .send()
            .await
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(StatsError::RequestFailed(format!("HTTP {}: {}", status, error_text)));
        }

        response
            .json::<Vec<ViewStats>>()
            .await
            .map_err(|e| StatsError::InvalidResponse(e.to_string()))
    }

    /// Unique views per event id. Events without reported hits are absent from the map.
    pub async fn views_by_event(
        &self,
        event_ids: &[i64],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StatsResult<HashMap<i64, i64>> {
        if event_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let uris: Vec<String> = event_ids.iter().map(|&id| event_uri(id)).collect();
        let stats = self.query_hits(start, end, &uris, true).await?;

        Ok(collect_views(&stats))
    }

    /// Whether the statistics service answers a trivial query
    pub async fn health_check(&self) -> bool {
        let now = Utc::now();
        self.query_hits(now, now, &[], false).await.is_ok()
    }
}

/// Fold stats rows into per-event counts, summing duplicate rows for one event
pub fn collect_views(stats: &[ViewStats]) -> HashMap<i64, i64> {
    let mut views = HashMap::new();
    for row in stats {
        if let Some(id) = event_id_from_uri(&row.uri) {
            *views.entry(id).or_insert(0) += row.hits;
        }
    }
    views
}

fn map_transport_error(e: reqwest::Error) -> StatsError {
    if e.is_timeout() {
        StatsError::Timeout
    } else if e.is_connect() {
        StatsError::ServiceUnavailable
    } else {
        StatsError::RequestFailed(e.to_string())
    }
}
