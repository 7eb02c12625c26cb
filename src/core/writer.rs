use crate::core::channel::ResultReceiver;
use crate::domain::model::{BrokenModules, ResolvedPackage, WriterReport};
use crate::utils::error::Result;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWrite, AsyncWriteExt, BufWriter};

/// Render one manifest line, newline included.
///
/// Known-broken packages are written commented out with their reason so the
/// pin stays visible without being installed.
pub fn format_line(package: &ResolvedPackage, broken: &BrokenModules) -> String {
    match broken.reason(&package.name) {
        Some(reason) => format!("# {}<={} # {}\n", package.name, package.version, reason),
        None => format!("{}<={}\n", package.name, package.version),
    }
}

/// The only consumer of the result channel and the only writer of the manifest.
pub struct ManifestWriter<W: AsyncWrite + Unpin + Send> {
    out: BufWriter<W>,
    broken: BrokenModules,
}

impl ManifestWriter<File> {
    /// Create (or truncate) the manifest at `path`.
    pub async fn create<P: AsRef<Path>>(path: P, broken: BrokenModules) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let file = File::create(path).await?;
        tracing::debug!("Opened manifest {}", path.display());
        Ok(Self::new(file, broken))
    }
}

impl<W: AsyncWrite + Unpin + Send> ManifestWriter<W> {
    pub fn new(out: W, broken: BrokenModules) -> Self {
        Self {
            out: BufWriter::new(out),
            broken,
        }
    }

    /// Drain `rx` until it is closed, then flush.
    ///
    /// Each package is acknowledged after its line reaches the buffer, which is
    /// what the drain barrier waits on.
    pub async fn run(mut self, mut rx: ResultReceiver) -> Result<WriterReport> {
        let mut report = WriterReport::default();

        while let Some(package) = rx.recv().await {
            let line = format_line(&package, &self.broken);
            let written = self.out.write_all(line.as_bytes()).await;
            rx.task_done();
            written?;

            report.written += 1;
            if self.broken.contains(&package.name) {
                report.annotated += 1;
                tracing::debug!("Annotated known-broken package {}", package.name);
            }
        }

        self.out.flush().await?;
        self.out.shutdown().await?;
        tracing::debug!(
            "Writer finished: {} lines ({} annotated)",
            report.written,
            report.annotated
        );
        Ok(report)
    }
}
