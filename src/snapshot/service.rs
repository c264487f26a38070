use std::sync::Arc;
use tracing::{info, instrument};

use super::{store::SnapshotStore, TrackerSnapshot};
use crate::{
    game::repository::GameRepository, player::repository::PlayerRepository, shared::AppError,
};

/// Wholesale export/import of the tracker state
pub struct SnapshotService {
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    game_repository: Arc<dyn GameRepository + Send + Sync>,
}

impl SnapshotService {
    pub fn new(
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        game_repository: Arc<dyn GameRepository + Send + Sync>,
    ) -> Self {
        Self {
            player_repository,
            game_repository,
        }
    }

    /// Captures the full roster and game log as one document
    #[instrument(skip(self))]
    pub async fn export(&self) -> Result<TrackerSnapshot, AppError> {
        Ok(TrackerSnapshot {
            players: self.player_repository.list_players().await?,
            games: self.game_repository.list_games().await?,
        })
    }

    /// Replaces the full roster and game log with the snapshot's contents.
    /// Whatever was there before is gone; last writer wins.
    #[instrument(skip(self, snapshot))]
    pub async fn import(&self, snapshot: TrackerSnapshot) -> Result<(), AppError> {
        info!(
            player_count = snapshot.players.len(),
            game_count = snapshot.games.len(),
            "Importing snapshot wholesale"
        );

        self.player_repository.replace_all(snapshot.players).await?;
        self.game_repository.replace_all(snapshot.games).await?;
        Ok(())
    }

    /// Loads a previously saved blob into the repositories, if one exists
    #[instrument(skip(self, store))]
    pub async fn restore_from(&self, store: &dyn SnapshotStore) -> Result<bool, AppError> {
        match store.load().await? {
            Some(snapshot) => {
                self.import(snapshot).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Writes the current state out as one blob, overwriting any previous one
    #[instrument(skip(self, store))]
    pub async fn persist_to(&self, store: &dyn SnapshotStore) -> Result<(), AppError> {
        let snapshot = self.export().await?;
        store.save(&snapshot).await
    }
}
