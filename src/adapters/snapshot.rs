//! Package names taken from the keys of a bulk JSON snapshot.

use crate::domain::model::PackageName;
use crate::domain::ports::InputProvider;
use crate::utils::error::{PinError, Result};
use async_trait::async_trait;
use reqwest::Client;

pub struct SnapshotProvider {
    client: Client,
    url: String,
}

impl SnapshotProvider {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl InputProvider for SnapshotProvider {
    /// The snapshot is unranked; `limit` is ignored.
    async fn fetch_ranked_names(&self, _limit: usize) -> Result<Vec<PackageName>> {
        tracing::info!("📥 Downloading package snapshot from {}", self.url);

        let response = self.client.get(&self.url).send().await?;
        if !response.status().is_success() {
            return Err(PinError::DiscoveryFailed {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await?;
        let document: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&body)?;

        // JSON 物件的鍵本身就是唯一的
        Ok(document
            .into_iter()
            .map(|(name, _)| name)
            .filter(|name| !name.is_empty())
            .collect())
    }

    fn describe(&self) -> String {
        format!("snapshot at {}", self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::collections::HashSet;

    #[tokio::test]
    async fn test_snapshot_keys_become_names() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/snapshot.json");
            then.status(200).json_body(serde_json::json!({
                "requests": {"downloads": 10},
                "numpy": {"downloads": 20},
                "flask": null
            }));
        });

        let provider = SnapshotProvider::new(Client::new(), server.url("/snapshot.json"));
        let names = provider.fetch_ranked_names(1).await.unwrap();

        mock.assert();
        let names: HashSet<String> = names.into_iter().collect();
        let expected: HashSet<String> = ["requests", "numpy", "flask"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn test_snapshot_must_be_an_object() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/snapshot.json");
            then.status(200).json_body(serde_json::json!(["requests"]));
        });

        let provider = SnapshotProvider::new(Client::new(), server.url("/snapshot.json"));
        let err = provider.fetch_ranked_names(1).await.unwrap_err();
        assert!(matches!(err, PinError::SerializationError(_)));
    }

    #[tokio::test]
    async fn test_snapshot_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/snapshot.json");
            then.status(404);
        });

        let provider = SnapshotProvider::new(Client::new(), server.url("/snapshot.json"));
        let err = provider.fetch_ranked_names(1).await.unwrap_err();
        assert!(matches!(err, PinError::DiscoveryFailed { status: 404, .. }));
    }
}
