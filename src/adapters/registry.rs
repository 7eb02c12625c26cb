//! PyPI JSON API client.

use crate::domain::model::ResolvedPackage;
use crate::utils::error::{PinError, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_REGISTRY_URL: &str = "https://pypi.org";

/// Why a package produced no manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Registry answered with something other than 200.
    Status(u16),
    /// Project exists but has no files for its latest release.
    NoDistributions,
    /// Timed out or the connection failed.
    Unreachable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(ResolvedPackage),
    Skipped(SkipReason),
}

/// HTTP client bound to one registry base URL. Clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("reqpin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn project_url(&self, name: &str) -> String {
        format!("{}/pypi/{}/json", self.base_url, name)
    }

    /// Resolve the latest version of `name`.
    ///
    /// Returns `Err(ContractViolation)` when a 200 response does not have the
    /// `{info: {version}, urls: [...]}` shape.
    pub async fn lookup(&self, name: &str) -> Result<Lookup> {
        let url = self.project_url(name);
        tracing::trace!("GET {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return Ok(Lookup::Skipped(SkipReason::Unreachable(e.to_string()))),
        };

        let status = response.status();
        if status != StatusCode::OK {
            return Ok(Lookup::Skipped(SkipReason::Status(status.as_u16())));
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => return Ok(Lookup::Skipped(SkipReason::Unreachable(e.to_string()))),
        };

        let violation = |detail: &str| PinError::ContractViolation {
            package: name.to_string(),
            detail: detail.to_string(),
        };

        let document: Value = serde_json::from_slice(&body)
            .map_err(|e| violation(&format!("invalid project document: {}", e)))?;

        // 先看 urls，info 只在有發佈檔案時才讀取
        match document.get("urls") {
            None => return Err(violation("missing 'urls'")),
            Some(Value::Null) => return Ok(Lookup::Skipped(SkipReason::NoDistributions)),
            // 佔位名稱或保留名稱沒有任何發佈檔案
            Some(Value::Array(urls)) if urls.is_empty() => {
                return Ok(Lookup::Skipped(SkipReason::NoDistributions))
            }
            Some(Value::Array(_)) => {}
            Some(_) => return Err(violation("'urls' is not an array")),
        }

        let version = document
            .get("info")
            .and_then(|info| info.get("version"))
            .and_then(Value::as_str)
            .ok_or_else(|| violation("missing 'info.version'"))?;

        Ok(Lookup::Found(ResolvedPackage::new(name, version)))
    }
}
