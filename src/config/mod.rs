pub mod cli;

use crate::adapters::analytics::DEFAULT_ANALYTICS_HOST;
use crate::adapters::registry::DEFAULT_REGISTRY_URL;
use crate::core::{ConfigProvider, OnContractViolation};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_required_field, validate_url, Validate,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Top packages by total downloads
    Analytics,
    /// Every key of a JSON snapshot document
    Snapshot,
    /// A local file with one name per line
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "reqpin")]
#[command(about = "Pin the latest version of the most popular PyPI packages")]
pub struct CliConfig {
    /// Number of concurrent fetch workers
    #[arg(short, long, default_value = "100")]
    pub workers: usize,

    /// Output manifest path
    #[arg(short, long, default_value = "requirements.txt")]
    pub requirement: String,

    /// How many top packages to request (analytics source only)
    #[arg(short, long, default_value = "100")]
    pub limit: usize,

    #[arg(long, value_enum, default_value = "analytics")]
    pub source: Source,

    #[arg(long, default_value = DEFAULT_REGISTRY_URL)]
    pub registry_url: String,

    #[arg(long, default_value = DEFAULT_ANALYTICS_HOST)]
    pub analytics_host: String,

    /// Required with --source snapshot
    #[arg(long)]
    pub snapshot_url: Option<String>,

    /// Required with --source file
    #[arg(long)]
    pub names_file: Option<String>,

    /// Per-request timeout in seconds; timed out packages are skipped
    #[arg(long, default_value = "30")]
    pub request_timeout: u64,

    /// Extra TOML file with a [broken] table of package = "reason"
    #[arg(long)]
    pub broken_modules: Option<String>,

    /// Do not load the built-in broken-module table
    #[arg(long)]
    pub no_builtin_broken: bool,

    #[arg(long, value_enum, default_value = "fail")]
    pub on_contract_violation: OnContractViolation,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub log_json: bool,
}

impl ConfigProvider for CliConfig {
    fn registry_url(&self) -> &str {
        &self.registry_url
    }

    fn output_path(&self) -> &str {
        &self.requirement
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn limit(&self) -> usize {
        self.limit
    }

    fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    fn on_contract_violation(&self) -> OnContractViolation {
        self.on_contract_violation
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_positive_number("workers", self.workers, 1)?;
        validate_positive_number("limit", self.limit, 1)?;
        validate_positive_number("request_timeout", self.request_timeout as usize, 1)?;
        validate_path("requirement", &self.requirement)?;
        validate_url("registry_url", &self.registry_url)?;

        match self.source {
            Source::Analytics => validate_url("analytics_host", &self.analytics_host)?,
            Source::Snapshot => {
                let url = validate_required_field("snapshot_url", &self.snapshot_url)?;
                validate_url("snapshot_url", url)?;
            }
            Source::File => {
                let path = validate_required_field("names_file", &self.names_file)?;
                validate_path("names_file", path)?;
            }
        }

        if let Some(path) = &self.broken_modules {
            validate_path("broken_modules", path)?;
        }

        Ok(())
    }
}
