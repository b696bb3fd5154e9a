use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use anyhow::Context as _;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Directory of uploaded images. Files are named by random UUIDs and purged
/// once they outlive the configured TTL.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the upload directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create upload dir {}", self.dir.display()))
    }

    /// Write `bytes` under a fresh random name and return the full path.
    pub async fn save(&self, bytes: &[u8]) -> anyhow::Result<PathBuf> {
        self.ensure_dir().await?;
        let path = self.dir.join(Uuid::new_v4().simple().to_string());
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("write upload {}", path.display()))?;
        Ok(path)
    }

    /// Delete regular files last modified at least `ttl` ago. Returns how many were removed.
    pub async fn purge_older_than(&self, ttl: Duration) -> anyhow::Result<usize> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e).context("read upload dir"),
        };

        let now = SystemTime::now();
        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await.context("read upload dir entry")? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age < ttl {
                continue;
            }
            match tokio::fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    tracing::warn!(path = %entry.path().display(), error = %e, "failed to delete upload");
                }
            }
        }
        Ok(removed)
    }

    /// Run [`Self::purge_older_than`] every `interval` for as long as the process lives.
    pub fn spawn_purge_task(&self, interval: Duration, ttl: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                tracing::info!(dir = %store.dir.display(), "purging old uploads");
                match store.purge_older_than(ttl).await {
                    Ok(removed) => tracing::info!(removed, "upload purge finished"),
                    Err(e) => tracing::error!(error = %format!("{e:#}"), "upload purge failed"),
                }
            }
        })
    }
}
