pub mod adapters;
#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, Source};

pub use crate::adapters::registry::RegistryClient;
pub use crate::core::{
    generator::Generator,
    pipeline::{FetchPipeline, PipelineOptions},
};
pub use crate::domain::model::{BrokenModules, ResolvedPackage, RunSummary};
pub use crate::domain::ports::{InputProvider, OnContractViolation};
pub use crate::utils::error::{PinError, Result};
