use crate::adapters::dedup_names;
use crate::domain::model::PackageName;
use crate::domain::ports::InputProvider;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::PathBuf;

/// Names read from a local file, one per line. Blank lines and `#` comments
/// are ignored; file order is kept.
pub struct NamesFileProvider {
    path: PathBuf,
}

impl NamesFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(content: &str) -> Vec<PackageName> {
        let names = content
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        dedup_names(names)
    }
}

#[async_trait]
impl InputProvider for NamesFileProvider {
    async fn fetch_ranked_names(&self, _limit: usize) -> Result<Vec<PackageName>> {
        tracing::info!("📥 Reading package names from {}", self.path.display());
        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(Self::parse(&content))
    }

    fn describe(&self) -> String {
        format!("names file {}", self.path.display())
    }
}
