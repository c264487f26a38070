use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

use super::TrackerSnapshot;
use crate::shared::AppError;

/// Opaque blob store for the whole tracker state, keyed by a fixed path.
///
/// Read wholesale on load, overwritten wholesale on save. There is no
/// partial update and no conflict detection; across devices the last
/// writer wins.
#[async_trait]
pub trait SnapshotStore {
    async fn load(&self) -> Result<Option<TrackerSnapshot>, AppError>;
    async fn save(&self, snapshot: &TrackerSnapshot) -> Result<(), AppError>;
}

/// File-backed snapshot store: one JSON document on disk
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotStore for FileSnapshotStore {
    #[instrument(skip(self))]
    async fn load(&self) -> Result<Option<TrackerSnapshot>, AppError> {
        debug!(path = %self.path.display(), "Loading snapshot blob");

        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No snapshot blob present");
                return Ok(None);
            }
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Failed to read snapshot blob");
                return Err(AppError::DatabaseError(e.to_string()));
            }
        };

        let snapshot = serde_json::from_slice(&bytes).map_err(|e| {
            warn!(error = %e, path = %self.path.display(), "Failed to decode snapshot blob");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(Some(snapshot))
    }

    #[instrument(skip(self, snapshot))]
    async fn save(&self, snapshot: &TrackerSnapshot) -> Result<(), AppError> {
        debug!(
            path = %self.path.display(),
            player_count = snapshot.players.len(),
            game_count = snapshot.games.len(),
            "Saving snapshot blob"
        );

        let bytes = serde_json::to_vec_pretty(snapshot).map_err(|e| {
            warn!(error = %e, "Failed to encode snapshot blob");
            AppError::DatabaseError(e.to_string())
        })?;

        tokio::fs::write(&self.path, bytes).await.map_err(|e| {
            warn!(error = %e, path = %self.path.display(), "Failed to write snapshot blob");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
