use crate::core::pipeline::FetchPipeline;
use crate::domain::model::RunSummary;
use crate::domain::ports::InputProvider;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use chrono::Utc;
use std::time::Instant;

/// Loads the package list and drives the fetch pipeline over it.
pub struct Generator {
    provider: Box<dyn InputProvider>,
    pipeline: FetchPipeline,
    limit: usize,
    monitor: SystemMonitor,
}

impl Generator {
    pub fn new(provider: Box<dyn InputProvider>, pipeline: FetchPipeline, limit: usize) -> Self {
        Self::new_with_monitoring(provider, pipeline, limit, false)
    }

    pub fn new_with_monitoring(
        provider: Box<dyn InputProvider>,
        pipeline: FetchPipeline,
        limit: usize,
        monitor_enabled: bool,
    ) -> Self {
        Self {
            provider,
            pipeline,
            limit,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        let started_at = Utc::now();
        let clock = Instant::now();
        self.monitor.log_stats("Start");

        tracing::info!("🔎 Loading package list from {}", self.provider.describe());
        let names = self.provider.fetch_ranked_names(self.limit).await?;
        let total = names.len();
        tracing::info!("total: {}", total);
        self.monitor.log_stats("Package list loaded");

        let options = self.pipeline.options();
        tracing::info!(
            "🚚 Resolving {} packages with {} workers into {}",
            total,
            options.workers,
            options.output.display()
        );
        let report = self.pipeline.run(names).await?;
        self.monitor.log_stats("Resolve");
        self.monitor.log_final_stats();

        Ok(RunSummary {
            total,
            accepted: report.accepted(),
            skipped: report.skipped(),
            written: report.writer.written,
            annotated: report.writer.annotated,
            workers: options.workers,
            output: options.output.display().to_string(),
            started_at,
            elapsed: clock.elapsed(),
        })
    }
}
