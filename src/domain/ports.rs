use crate::domain::model::PackageName;
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What the fetch pipeline does when a registry document is missing fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OnContractViolation {
    /// Stop the owning worker and fail the run once every other worker is done.
    #[default]
    Fail,
    /// Log the package and move on.
    Skip,
}

pub trait ConfigProvider: Send + Sync {
    fn registry_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn workers(&self) -> usize;
    fn limit(&self) -> usize;
    fn request_timeout(&self) -> Duration;
    fn on_contract_violation(&self) -> OnContractViolation;
}

/// A source of package names, ordered and deduplicated.
#[async_trait]
pub trait InputProvider: Send + Sync {
    /// `limit` is a hint; unranked sources return everything they have.
    async fn fetch_ranked_names(&self, limit: usize) -> Result<Vec<PackageName>>;

    fn describe(&self) -> String;
}
