use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Per-worker progress indicator.
///
/// Each worker owns one; every advance is also added to the run-wide counter
/// that the reporter task reads.
#[derive(Debug)]
pub struct WorkerProgress {
    worker: usize,
    total: usize,
    processed: usize,
    overall: Arc<AtomicUsize>,
    started: Instant,
}

impl WorkerProgress {
    pub fn new(worker: usize, total: usize, overall: Arc<AtomicUsize>) -> Self {
        Self {
            worker,
            total,
            processed: 0,
            overall,
            started: Instant::now(),
        }
    }

    pub fn advance(&mut self) {
        self.processed += 1;
        self.overall.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn finish(self) {
        tracing::debug!(
            worker = self.worker,
            processed = self.processed,
            total = self.total,
            elapsed = ?self.started.elapsed(),
            "worker finished"
        );
    }
}

/// Log the run-wide progress every `interval` until the handle is aborted.
pub fn spawn_progress_reporter(
    overall: Arc<AtomicUsize>,
    total: usize,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // 第一次 tick 立即返回
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let done = overall.load(Ordering::Relaxed);
            let percent = if total > 0 {
                done as f64 / total as f64 * 100.0
            } else {
                100.0
            };
            tracing::info!("⏳ Resolved {}/{} packages ({:.1}%)", done, total, percent);
            if done >= total {
                return;
            }
        }
    })
}
