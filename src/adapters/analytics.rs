//! Ranked package list from the public ClickHouse PyPI downloads dataset.

use crate::adapters::dedup_names;
use crate::domain::model::PackageName;
use crate::domain::ports::InputProvider;
use crate::utils::error::{PinError, Result};
use async_trait::async_trait;
use reqwest::Client;

pub const DEFAULT_ANALYTICS_HOST: &str = "https://clickpy-clickhouse.clickhouse.com/";

pub fn ranking_query(limit: usize) -> String {
    format!(
        "SELECT project FROM pypi.pypi_downloads GROUP BY project ORDER BY sum(count) DESC LIMIT {} FORMAT JSONCompactColumns",
        limit
    )
}

pub struct AnalyticsProvider {
    client: Client,
    host: String,
    headroom: usize,
}

impl AnalyticsProvider {
    pub fn new(client: Client, host: impl Into<String>) -> Self {
        Self {
            client,
            host: host.into(),
            headroom: 0,
        }
    }

    /// Ask for `headroom` extra names so that roughly `limit` useful ones remain
    /// once known-broken packages are commented out.
    pub fn with_headroom(mut self, headroom: usize) -> Self {
        self.headroom = headroom;
        self
    }
}

#[async_trait]
impl InputProvider for AnalyticsProvider {
    async fn fetch_ranked_names(&self, limit: usize) -> Result<Vec<PackageName>> {
        let requested = limit.saturating_add(self.headroom);
        tracing::info!("📥 Download top {} modules (requesting {})", limit, requested);

        let response = self
            .client
            .get(&self.host)
            .query(&[("user", "play"), ("query", ranking_query(requested).as_str())])
            .send()
            .await?;

        tracing::debug!("Analytics response status: {}", response.status());
        if !response.status().is_success() {
            return Err(PinError::DiscoveryFailed {
                url: self.host.clone(),
                status: response.status().as_u16(),
            });
        }

        // ClickHouse 回傳 text/plain，手動解析 JSON
        let body = response.text().await?;
        let columns: Vec<Vec<serde_json::Value>> = serde_json::from_str(&body)?;
        let first = columns.into_iter().next().unwrap_or_default();

        let names = first
            .into_iter()
            .filter_map(|value| match value {
                serde_json::Value::String(name) if !name.is_empty() => Some(name),
                _ => None,
            })
            .collect();

        Ok(dedup_names(names))
    }

    fn describe(&self) -> String {
        format!("analytics query at {}", self.host)
    }
}
