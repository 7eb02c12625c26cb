use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// A registry project name, as the registry spells it.
pub type PackageName = String;

/// A contiguous slice of the input owned by one worker.
pub type Batch = Vec<PackageName>;

/// Latest version reported by the registry for one package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedPackage {
    pub name: PackageName,
    pub version: String,
}

impl ResolvedPackage {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

const BUILTIN_BROKEN_MODULES: &str = include_str!("../../configs/broken-modules.toml");

#[derive(Debug, Default, Deserialize)]
struct BrokenModulesFile {
    #[serde(default)]
    broken: HashMap<String, String>,
}

/// Known-broken packages and why. Read-only once the pipeline starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrokenModules {
    entries: HashMap<PackageName, String>,
}

impl BrokenModules {
    pub fn new(entries: HashMap<PackageName, String>) -> Self {
        Self { entries }
    }

    /// The curated table shipped with the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_BROKEN_MODULES)
    }

    /// 解析 `[broken]` 表
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: BrokenModulesFile = toml::from_str(content)?;
        Ok(Self::new(file.broken))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Entries from `other` win on conflict.
    pub fn merged_with(mut self, other: BrokenModules) -> Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn reason(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for BrokenModules {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Counters a fetch worker returns when its batch is exhausted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub worker: usize,
    pub processed: usize,
    pub accepted: usize,
    pub skipped: usize,
}

/// Counters the writer returns after its final flush.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterReport {
    pub written: usize,
    pub annotated: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub total: usize,
    pub accepted: usize,
    pub skipped: usize,
    pub written: usize,
    pub annotated: usize,
    pub workers: usize,
    pub output: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}
