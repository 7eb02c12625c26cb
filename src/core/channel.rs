//! Multi-producer, single-consumer queue between the fetch workers and the
//! writer.
//!
//! The queue is unbounded so producers never wait on the writer. Every sent
//! item stays "pending" until the consumer acknowledges it with
//! [`ResultReceiver::task_done`]; [`DrainBarrier::wait`] resolves once nothing is
//! pending. Dropping every [`ResultSender`] closes the queue, after which
//! [`ResultReceiver::recv`] returns `None` once the buffered items are gone.

use crate::domain::model::ResolvedPackage;
use crate::utils::error::{PinError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Notify};

#[derive(Debug, Default)]
struct Pending {
    count: AtomicUsize,
    drained: Notify,
}

impl Pending {
    fn complete_one(&self) {
        if self.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.drained.notify_waiters();
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResultSender {
    tx: mpsc::UnboundedSender<ResolvedPackage>,
    pending: Arc<Pending>,
}

impl ResultSender {
    pub fn send(&self, package: ResolvedPackage) -> Result<()> {
        self.pending.count.fetch_add(1, Ordering::AcqRel);
        self.tx.send(package).map_err(|err| {
            self.pending.complete_one();
            PinError::ChannelClosed {
                package: err.0.name,
            }
        })
    }
}

#[derive(Debug)]
pub struct ResultReceiver {
    rx: mpsc::UnboundedReceiver<ResolvedPackage>,
    pending: Arc<Pending>,
}

impl ResultReceiver {
    /// Next package, or `None` once every sender is gone and the queue is empty.
    pub async fn recv(&mut self) -> Option<ResolvedPackage> {
        self.rx.recv().await
    }

    /// Mark one received package as fully processed.
    pub fn task_done(&self) {
        self.pending.complete_one();
    }
}

impl Drop for ResultReceiver {
    fn drop(&mut self) {
        // 丟棄未處理的項目，避免 DrainBarrier 永遠等待
        self.rx.close();
        while self.rx.try_recv().is_ok() {
            self.pending.complete_one();
        }
    }
}

#[derive(Debug, Clone)]
pub struct DrainBarrier {
    pending: Arc<Pending>,
}

impl DrainBarrier {
    /// Wait until every package sent so far has been acknowledged.
    pub async fn wait(&self) {
        loop {
            let notified = self.pending.drained.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.pending.count.load(Ordering::Acquire) == 0 {
                return;
            }
            notified.await;
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.count.load(Ordering::Acquire)
    }
}

pub fn result_channel() -> (ResultSender, ResultReceiver, DrainBarrier) {
    let (tx, rx) = mpsc::unbounded_channel();
    let pending = Arc::new(Pending::default());
    (
        ResultSender {
            tx,
            pending: Arc::clone(&pending),
        },
        ResultReceiver {
            rx,
            pending: Arc::clone(&pending),
        },
        DrainBarrier { pending },
    )
}
