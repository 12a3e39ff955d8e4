//! Consumers of authenticated push payloads.
//!
//! Interpreting a payload is outside this crate; a sink only receives bytes
//! whose signature has already been checked.

use std::{
    path::PathBuf,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use crate::error::Error;

#[async_trait]
pub trait ContentSink: Send + Sync {
    async fn apply(&self, topic: &str, payload: &[u8]) -> Result<(), Error>;
}

/// Records accepted payloads in the log and drops them.
#[derive(Debug, Default)]
pub struct TracingSink;

#[async_trait]
impl ContentSink for TracingSink {
    async fn apply(&self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        info!("Accepted push for {} ({} bytes)", topic, payload.len());
        Ok(())
    }
}

/// Writes every accepted payload to its own file for a separate importer.
#[derive(Debug)]
pub struct SpoolSink {
    directory: PathBuf,
    sequence: AtomicU64,
}

impl SpoolSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        SpoolSink {
            directory: directory.into(),
            sequence: AtomicU64::new(0),
        }
    }

    fn next_path(&self) -> PathBuf {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let name = format!(
            "{}-{:06}.push",
            Utc::now().format("%Y%m%dT%H%M%S%.6f"),
            sequence
        );
        self.directory.join(name)
    }
}

#[async_trait]
impl ContentSink for SpoolSink {
    async fn apply(&self, topic: &str, payload: &[u8]) -> Result<(), Error> {
        tokio::fs::create_dir_all(&self.directory).await?;

        let path = self.next_path();
        let tmp = path.with_extension("tmp");

        tokio::fs::write(&tmp, payload).await?;
        tokio::fs::rename(&tmp, &path).await?;

        info!("Spooled push for {} to {}", topic, path.display());
        Ok(())
    }
}
