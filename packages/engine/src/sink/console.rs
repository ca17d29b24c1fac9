// packages/engine/src/sink/console.rs
//! Console sink

use crate::sink::record::EventRecord;
use crate::sink::{Batch, Sink};
use crate::utils::errors::Result;
use async_trait::async_trait;
use chrono::SecondsFormat;
use std::fmt::Write as _;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleFormat {
    /// `timestamp [LEVEL] category[id]: message`
    #[default]
    Text,
    
    /// One JSON object per line
    Json,
}

/// Writes batches to stdout, one line per event
pub struct ConsoleSink {
    format: ConsoleFormat,
    stdout: Mutex<tokio::io::Stdout>,
}

impl ConsoleSink {
    pub fn new(format: ConsoleFormat) -> Self {
        Self {
            format,
            stdout: Mutex::new(tokio::io::stdout()),
        }
    }
    
    /// Render a whole batch into one buffer
    pub fn render(&self, batch: &Batch) -> Result<String> {
        let mut out = String::new();
        
        for event in batch {
            match self.format {
                ConsoleFormat::Json => {
                    out.push_str(&serde_json::to_string(&EventRecord::from(event))?);
                    out.push('\n');
                }
                ConsoleFormat::Text => {
                    let _ = write!(
                        out,
                        "{} [{}] {}[{}]",
                        event.timestamp().to_rfc3339_opts(SecondsFormat::Millis, true),
                        event.level().short_name(),
                        event.category(),
                        event.event_id(),
                    );
                    if let Some(message) = event.message() {
                        let _ = write!(out, ": {}", message);
                    }
                    out.push('\n');
                    
                    if let Some(error) = event.error() {
                        let _ = writeln!(out, "      error: {}", error);
                    }
                    if !event.scopes().is_empty() {
                        out.push_str("     ");
                        for scope in event.scopes() {
                            let _ = write!(out, " => {:?}", scope);
                        }
                        out.push('\n');
                    }
                }
            }
        }
        
        Ok(out)
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(ConsoleFormat::default())
    }
}

#[async_trait]
impl Sink for ConsoleSink {
    async fn write(&self, batch: Batch, _cancel: CancellationToken) -> Result<()> {
        let rendered = self.render(&batch)?;
        
        let mut stdout = self.stdout.lock().await;
        stdout.write_all(rendered.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}
