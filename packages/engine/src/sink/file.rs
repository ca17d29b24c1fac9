// packages/engine/src/sink/file.rs
//! File sink writing JSON lines

use crate::sink::record::EventRecord;
use crate::sink::{Batch, Sink};
use crate::utils::errors::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Appends every event as one JSON object per line
///
/// The file (and its parent directories) is created on the first write and
/// kept open afterwards. Each batch is written and flushed as one unit.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<Option<File>>,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: Mutex::new(None),
        }
    }
    
    pub fn path(&self) -> &Path {
        &self.path
    }
    
    async fn open(&self) -> Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        
        debug!("Opened log file {:?}", self.path);
        Ok(file)
    }
}

#[async_trait]
impl Sink for FileSink {
    async fn write(&self, batch: Batch, _cancel: CancellationToken) -> Result<()> {
        let mut buffer = Vec::with_capacity(batch.len() * 128);
        for event in &batch {
            serde_json::to_writer(&mut buffer, &EventRecord::from(event))?;
            buffer.push(b'\n');
        }
        
        let mut guard = self.file.lock().await;
        let mut file = match guard.take() {
            Some(file) => file,
            None => self.open().await?,
        };
        
        // On failure the handle is dropped and reopened on the next batch
        file.write_all(&buffer).await?;
        file.flush().await?;
        
        *guard = Some(file);
        Ok(())
    }
}
