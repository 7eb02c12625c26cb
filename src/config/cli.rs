use crate::adapters::analytics::AnalyticsProvider;
use crate::adapters::names_file::NamesFileProvider;
use crate::adapters::registry::RegistryClient;
use crate::adapters::snapshot::SnapshotProvider;
use crate::config::{CliConfig, Source};
use crate::core::generator::Generator;
use crate::core::pipeline::{FetchPipeline, PipelineOptions};
use crate::core::{BrokenModules, ConfigProvider, InputProvider};
use crate::utils::error::{PinError, Result};
use reqwest::Client;

impl CliConfig {
    /// Built-in table (unless disabled) overlaid with the user's file.
    pub fn load_broken_modules(&self) -> Result<BrokenModules> {
        let mut broken = if self.no_builtin_broken {
            BrokenModules::default()
        } else {
            BrokenModules::builtin()?
        };

        if let Some(path) = &self.broken_modules {
            let extra = BrokenModules::from_file(path)?;
            tracing::debug!("Loaded {} broken modules from {}", extra.len(), path);
            broken = broken.merged_with(extra);
        }

        Ok(broken)
    }

    pub fn input_provider(&self, broken: &BrokenModules) -> Result<Box<dyn InputProvider>> {
        let client = Client::builder().timeout(self.request_timeout()).build()?;

        let provider: Box<dyn InputProvider> = match self.source {
            Source::Analytics => Box::new(
                AnalyticsProvider::new(client, self.analytics_host.clone())
                    .with_headroom(broken.len()),
            ),
            Source::Snapshot => {
                let url = self.snapshot_url.clone().ok_or_else(|| PinError::MissingConfigError {
                    field: "snapshot_url".to_string(),
                })?;
                Box::new(SnapshotProvider::new(client, url))
            }
            Source::File => {
                let path = self.names_file.clone().ok_or_else(|| PinError::MissingConfigError {
                    field: "names_file".to_string(),
                })?;
                Box::new(NamesFileProvider::new(path))
            }
        };

        Ok(provider)
    }

    pub fn build_generator(&self) -> Result<Generator> {
        let broken = self.load_broken_modules()?;
        tracing::info!("📋 {} known-broken packages will be commented out", broken.len());

        let provider = self.input_provider(&broken)?;
        let registry = RegistryClient::new(self.registry_url(), self.request_timeout())?;
        let options = PipelineOptions::new(self.workers(), self.output_path())
            .with_on_violation(self.on_contract_violation());
        let pipeline = FetchPipeline::new(registry, broken, options);

        Ok(Generator::new_with_monitoring(
            provider,
            pipeline,
            self.limit(),
            self.monitor,
        ))
    }
}
