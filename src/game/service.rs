use std::sync::Arc;
use tracing::{error, info, instrument};

use super::{
    models::GameModel,
    repository::GameRepository,
    types::{GameCreateRequest, GameResponse, GameUpdateRequest},
    validator::{validate_game_shape, validate_players_registered},
};
use crate::{
    player::repository::PlayerRepository,
    shared::AppError,
    stats::{StatsAggregator, StatsPolicy},
};

/// Service for the game recording flow: validation, persistence and the
/// stats aggregation the two must stay consistent with.
pub struct GameService {
    game_repository: Arc<dyn GameRepository + Send + Sync>,
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    aggregator: StatsAggregator,
}

impl GameService {
    pub fn new(
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    ) -> Self {
        Self {
            game_repository,
            player_repository: Arc::clone(&player_repository),
            aggregator: StatsAggregator::new(player_repository),
        }
    }

    /// Switches how deletes and edits treat previously applied stats
    pub fn with_stats_policy(mut self, policy: StatsPolicy) -> Self {
        self.aggregator = StatsAggregator::new(Arc::clone(&self.player_repository))
            .with_policy(policy);
        self
    }

    async fn validate(&self, player_scores: &[super::models::PlayerScore], location: &str) -> Result<(), AppError> {
        validate_game_shape(player_scores, location)?;
        let roster = self.player_repository.list_players().await?;
        validate_players_registered(player_scores, roster.iter().map(|p| p.name.as_str()))?;
        Ok(())
    }

    /// Records a new game: validate, persist, then fold into player stats.
    /// If the stats batch fails the stored game is removed again so the log
    /// and the aggregates never disagree.
    #[instrument(skip(self, request))]
    pub async fn record(&self, request: GameCreateRequest) -> Result<GameResponse, AppError> {
        self.validate(&request.player_scores, &request.location)
            .await?;

        let game = GameModel::new(request.player_scores, request.location, request.game_date);
        self.game_repository.create_game(&game).await?;

        if let Err(err) = self.aggregator.apply_game(&game).await {
            error!(game_id = %game.id, error = %err, "Stats update failed, removing stored game");
            if let Err(cleanup_err) = self.game_repository.delete_game(&game.id).await {
                error!(game_id = %game.id, error = %cleanup_err, "Failed to remove game after stats failure");
            }
            return Err(err);
        }

        info!(game_id = %game.id, location = %game.location, "Game recorded");
        Ok(game.into())
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<GameResponse>, AppError> {
        let log = self.game_repository.list_games().await?;
        Ok(log.into_iter().map(GameResponse::from).collect())
    }

    /// Edits a game wholesale: the old contribution is backed out of the
    /// stats and the new one applied, as one batch.
    #[instrument(skip(self, request))]
    pub async fn edit(
        &self,
        game_id: &str,
        request: GameUpdateRequest,
    ) -> Result<GameResponse, AppError> {
        let old = self
            .game_repository
            .get_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;

        self.validate(&request.player_scores, &request.location)
            .await?;

        let new = GameModel {
            id: old.id.clone(),
            player_scores: request.player_scores,
            location: request.location,
            game_date: request.game_date,
            timestamp: old.timestamp,
        };
        self.game_repository.update_game(&new).await?;

        if let Err(err) = self.aggregator.replace_game(&old, &new).await {
            error!(game_id = %game_id, error = %err, "Stats replacement failed, restoring old game");
            if let Err(restore_err) = self.game_repository.update_game(&old).await {
                error!(game_id = %game_id, error = %restore_err, "Failed to restore game after stats failure");
            }
            return Err(err);
        }

        info!(game_id = %game_id, "Game edited");
        Ok(new.into())
    }

    /// Deletes a game and backs its contribution out of player stats
    #[instrument(skip(self))]
    pub async fn remove(&self, game_id: &str) -> Result<(), AppError> {
        let old = self
            .game_repository
            .get_game(game_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Game not found".to_string()))?;

        self.game_repository.delete_game(game_id).await?;

        if let Err(err) = self.aggregator.reverse_game(&old).await {
            error!(game_id = %game_id, error = %err, "Stats reversal failed, restoring game");
            if let Err(restore_err) = self.game_repository.create_game(&old).await {
                error!(game_id = %game_id, error = %restore_err, "Failed to restore game after stats failure");
            }
            return Err(err);
        }

        info!(game_id = %game_id, "Game deleted");
        Ok(())
    }
}
