use crate::adapters::registry::RegistryClient;
use crate::core::channel::result_channel;
use crate::core::partition::partition;
use crate::core::worker::FetchWorker;
use crate::core::writer::ManifestWriter;
use crate::domain::model::{Batch, BrokenModules, PackageName, WorkerReport, WriterReport};
use crate::domain::ports::OnContractViolation;
use crate::utils::error::{PinError, Result};
use crate::utils::progress::{spawn_progress_reporter, WorkerProgress};
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWrite;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub workers: usize,
    pub output: PathBuf,
    pub on_violation: OnContractViolation,
    pub progress_interval: Duration,
}

impl PipelineOptions {
    pub fn new(workers: usize, output: impl Into<PathBuf>) -> Self {
        Self {
            workers,
            output: output.into(),
            on_violation: OnContractViolation::default(),
            progress_interval: Duration::from_secs(5),
        }
    }

    pub fn with_on_violation(mut self, on_violation: OnContractViolation) -> Self {
        self.on_violation = on_violation;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub workers: Vec<WorkerReport>,
    pub writer: WriterReport,
}

impl PipelineReport {
    pub fn accepted(&self) -> usize {
        self.workers.iter().map(|w| w.accepted).sum()
    }

    pub fn skipped(&self) -> usize {
        self.workers.iter().map(|w| w.skipped).sum()
    }
}

/// Partition, fan out to the fetch workers, funnel into the writer, shut down.
pub struct FetchPipeline {
    client: RegistryClient,
    broken: BrokenModules,
    options: PipelineOptions,
}

impl FetchPipeline {
    pub fn new(client: RegistryClient, broken: BrokenModules, options: PipelineOptions) -> Self {
        Self {
            client,
            broken,
            options,
        }
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Resolve every name and write the manifest.
    ///
    /// A failing worker does not stop the others: everything already accepted is
    /// still written and flushed, then the first failure is returned.
    pub async fn run(&self, names: Vec<PackageName>) -> Result<PipelineReport> {
        let total = names.len();
        let batches = partition(names, self.options.workers)?;
        tracing::debug!(
            "Partitioned {} packages into {} batches",
            total,
            batches.len()
        );

        let writer = ManifestWriter::create(&self.options.output, self.broken.clone()).await?;
        self.drive(batches, total, writer).await
    }

    async fn drive<W>(
        &self,
        batches: Vec<Batch>,
        total: usize,
        writer: ManifestWriter<W>,
    ) -> Result<PipelineReport>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx, barrier) = result_channel();

        // Writer 必須在任何 worker 之前啟動
        let mut writer_handle = tokio::spawn(writer.run(rx));

        let overall = Arc::new(AtomicUsize::new(0));
        let reporter =
            spawn_progress_reporter(Arc::clone(&overall), total, self.options.progress_interval);

        let worker_handles: Vec<JoinHandle<Result<WorkerReport>>> = batches
            .into_iter()
            .enumerate()
            .map(|(id, batch)| {
                let progress = WorkerProgress::new(id, batch.len(), Arc::clone(&overall));
                let worker = FetchWorker::new(
                    id,
                    self.client.clone(),
                    tx.clone(),
                    progress,
                    self.options.on_violation,
                );
                tokio::spawn(worker.run(batch))
            })
            .collect();

        let mut report = PipelineReport::default();
        let mut first_error: Option<PinError> = None;

        for (id, handle) in worker_handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(join_error) => Err(PinError::TaskFailed {
                    task: format!("worker {}", id),
                    message: join_error.to_string(),
                }),
            };

            match outcome {
                Ok(worker_report) => report.workers.push(worker_report),
                Err(err) => {
                    tracing::error!("Worker {} failed: {}", id, err);
                    first_error.get_or_insert(err);
                }
            }
        }
        reporter.abort();

        // 等待 writer 處理完所有已送出的結果；writer 提前結束則不能再等
        tokio::select! {
            _ = barrier.wait() => {}
            early = &mut writer_handle => {
                return Err(match early {
                    Ok(Err(err)) => err,
                    Ok(Ok(_)) => PinError::TaskFailed {
                        task: "writer".to_string(),
                        message: "stopped before the result channel was drained".to_string(),
                    },
                    Err(join_error) => PinError::TaskFailed {
                        task: "writer".to_string(),
                        message: join_error.to_string(),
                    },
                });
            }
        }

        // 最後一個 sender 被丟棄後 writer 迴圈才會結束
        drop(tx);
        report.writer = match writer_handle.await {
            Ok(writer_report) => writer_report?,
            Err(join_error) => {
                return Err(PinError::TaskFailed {
                    task: "writer".to_string(),
                    message: join_error.to_string(),
                })
            }
        };

        match first_error {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }
}
