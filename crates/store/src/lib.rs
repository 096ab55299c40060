//! Durable engagement storage: two append-only JSON array logs plus
//! overwritable named snapshots, all under one data directory.
//!
//! Appends are read-modify-write over the whole file. That policy is not
//! safe for concurrent writers on its own, so every cycle runs under the
//! store's async mutex; the store must be shared (`Arc`) rather than
//! cloned per task.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

use todak_core::{EngagementRecord, ReactionEvent};

const ENGAGEMENT_LOG: &str = "reaction-log.json";
const REACTION_EVENT_LOG: &str = "reaction-events.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not access `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A log file exists but does not parse. Fatal for the call that hit
    /// it; the store never attempts repair.
    #[error("log file `{path}` is not parseable: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub struct EngagementStore {
    data_dir: PathBuf,
    file_lock: Mutex<()>,
}

impl EngagementStore {
    /// Opens a store rooted at `data_dir`, creating the directory if needed.
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(|source| StoreError::Io { path: data_dir.clone(), source })?;

        Ok(Self { data_dir, file_lock: Mutex::new(()) })
    }

    pub async fn append_engagement(&self, record: &EngagementRecord) -> Result<(), StoreError> {
        self.append(ENGAGEMENT_LOG, record).await
    }

    pub async fn append_reaction_event(&self, event: &ReactionEvent) -> Result<(), StoreError> {
        self.append(REACTION_EVENT_LOG, event).await
    }

    /// Full engagement log in insertion order; a missing file means the log
    /// is empty, not an error.
    pub async fn load_engagements(&self) -> Result<Vec<EngagementRecord>, StoreError> {
        let _guard = self.file_lock.lock().await;
        self.load(ENGAGEMENT_LOG).await
    }

    pub async fn load_reaction_events(&self) -> Result<Vec<ReactionEvent>, StoreError> {
        let _guard = self.file_lock.lock().await;
        self.load(REACTION_EVENT_LOG).await
    }

    /// Overwrites the named derived artifact. Snapshots are not append-only.
    pub async fn save_snapshot<T: Serialize>(
        &self,
        name: &str,
        data: &T,
    ) -> Result<(), StoreError> {
        let _guard = self.file_lock.lock().await;
        let path = self.data_dir.join(format!("{name}.json"));
        write_json(&path, data).await?;
        debug!(snapshot = name, path = %path.display(), "snapshot saved");
        Ok(())
    }

    async fn append<T>(&self, file: &str, item: &T) -> Result<(), StoreError>
    where
        T: Serialize + DeserializeOwned + Clone,
    {
        let _guard = self.file_lock.lock().await;
        let path = self.data_dir.join(file);

        let mut items: Vec<T> = load_json(&path).await?;
        items.push(item.clone());
        write_json(&path, &items).await?;

        debug!(log = file, entries = items.len(), "log entry appended");
        Ok(())
    }

    async fn load<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>, StoreError> {
        load_json(&self.data_dir.join(file)).await
    }
}

async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => return Err(StoreError::Io { path: path.to_path_buf(), source }),
    };

    serde_json::from_slice(&raw)
        .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })
}

async fn write_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let rendered = serde_json::to_vec_pretty(data)
        .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })?;

    tokio::fs::write(path, rendered)
        .await
        .map_err(|source| StoreError::Io { path: path.to_path_buf(), source })
}
