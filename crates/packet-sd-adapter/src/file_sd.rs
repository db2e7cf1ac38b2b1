//! Prometheus file_sd writer.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use packet_sd_core::{LabelSet, TargetGroup};
use serde::Serialize;
use tempfile::NamedTempFile;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::error::{AdapterError, AdapterResult};

/// One entry of a file_sd document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSdGroup {
    pub targets: Vec<String>,
    pub labels: LabelSet,
}

/// Keeps the latest target group per source and mirrors them to disk.
pub struct FileSdAdapter {
    output: PathBuf,
    groups: BTreeMap<String, TargetGroup>,
    /// Content of the last successful write. `None` until the first one.
    last_written: Option<String>,
}

impl FileSdAdapter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        Self {
            output: output.into(),
            groups: BTreeMap::new(),
            last_written: None,
        }
    }

    /// Merge a batch: groups with targets replace their source, groups
    /// without targets remove it.
    pub fn apply(&mut self, batch: Vec<TargetGroup>) {
        for tg in batch {
            if tg.targets.is_empty() {
                self.groups.remove(&tg.source);
            } else {
                self.groups.insert(tg.source.clone(), tg);
            }
        }
    }

    /// The file_sd document for the current groups, ordered by source.
    pub fn render(&self) -> Vec<FileSdGroup> {
        self.groups
            .values()
            .filter_map(|tg| {
                let mut targets: Vec<String> = tg.addresses().map(String::from).collect();
                if targets.is_empty() {
                    return None;
                }
                targets.sort();
                Some(FileSdGroup {
                    targets,
                    labels: tg.labels.clone(),
                })
            })
            .collect()
    }

    /// Write the rendered document if it differs from the last write.
    ///
    /// Returns whether the file was written. The first call always writes,
    /// so the file exists even when nothing has been discovered yet.
    ///
    /// The file I/O runs on the blocking pool.
    pub async fn write_if_changed(&mut self) -> AdapterResult<bool> {
        let content = serde_json::to_string_pretty(&self.render())?;
        if self.last_written.as_deref() == Some(content.as_str()) {
            return Ok(false);
        }

        let path = self.output.clone();
        let content = tokio::task::spawn_blocking(move || {
            write_atomic(&path, content.as_bytes()).map(|()| content)
        })
        .await??;

        self.last_written = Some(content);
        Ok(true)
    }

    /// Consume batches until every sender is gone.
    ///
    /// Write failures are logged and the adapter keeps going; the next
    /// batch retries the write since `last_written` was not updated.
    pub async fn run(mut self, mut rx: mpsc::Receiver<Vec<TargetGroup>>) {
        info!(path = %self.output.display(), "file_sd adapter started");

        while let Some(batch) = rx.recv().await {
            let received = batch.len();
            self.apply(batch);
            match self.write_if_changed().await {
                Ok(true) => {
                    debug!(received, groups = self.groups.len(), "target file updated");
                }
                Ok(false) => {
                    debug!(received, "target file unchanged");
                }
                Err(e) => {
                    error!(error = %e, path = %self.output.display(), "failed to write target file");
                }
            }
        }

        info!("file_sd adapter stopped");
    }
}

/// Write to a temp file next to `path`, then rename over it, so readers
/// never see a partial document.
fn write_atomic(path: &Path, content: &[u8]) -> AdapterResult<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let io_err = |source| AdapterError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(content).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|source| AdapterError::Persist {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
