use crate::adapters::registry::{Lookup, RegistryClient, SkipReason};
use crate::core::channel::ResultSender;
use crate::domain::model::{Batch, WorkerReport};
use crate::domain::ports::OnContractViolation;
use crate::utils::error::{PinError, Result};
use crate::utils::progress::WorkerProgress;

/// Resolves one batch, one package at a time, in batch order.
pub struct FetchWorker {
    id: usize,
    client: RegistryClient,
    tx: ResultSender,
    progress: WorkerProgress,
    on_violation: OnContractViolation,
}

impl FetchWorker {
    pub fn new(
        id: usize,
        client: RegistryClient,
        tx: ResultSender,
        progress: WorkerProgress,
        on_violation: OnContractViolation,
    ) -> Self {
        Self {
            id,
            client,
            tx,
            progress,
            on_violation,
        }
    }

    /// Consume the batch. The client and sender are released when this returns,
    /// on success and on error alike.
    pub async fn run(mut self, batch: Batch) -> Result<WorkerReport> {
        let mut report = WorkerReport {
            worker: self.id,
            ..WorkerReport::default()
        };

        for name in batch {
            let outcome = self.client.lookup(&name).await;
            self.progress.advance();
            report.processed += 1;

            match outcome {
                Ok(Lookup::Found(package)) => {
                    tracing::trace!(worker = self.id, "{}<={}", package.name, package.version);
                    if let Err(err) = self.tx.send(package) {
                        self.progress.finish();
                        return Err(err);
                    }
                    report.accepted += 1;
                }
                Ok(Lookup::Skipped(reason)) => {
                    report.skipped += 1;
                    match reason {
                        SkipReason::Status(status) => {
                            tracing::debug!(worker = self.id, "Skipping {}: HTTP {}", name, status)
                        }
                        SkipReason::NoDistributions => {
                            tracing::debug!(worker = self.id, "Skipping {}: no distributions", name)
                        }
                        SkipReason::Unreachable(err) => {
                            tracing::warn!(worker = self.id, "Skipping {}: {}", name, err)
                        }
                    }
                }
                Err(err @ PinError::ContractViolation { .. }) => match self.on_violation {
                    OnContractViolation::Skip => {
                        report.skipped += 1;
                        tracing::warn!(worker = self.id, "⚠️ {}", err);
                    }
                    OnContractViolation::Fail => {
                        tracing::error!(
                            worker = self.id,
                            "❌ {}; abandoning the remaining batch",
                            err
                        );
                        self.progress.finish();
                        return Err(err);
                    }
                },
                Err(err) => {
                    self.progress.finish();
                    return Err(err);
                }
            }
        }

        self.progress.finish();
        Ok(report)
    }
}
