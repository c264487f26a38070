use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::{
    models::PlayerModel,
    repository::PlayerRepository,
    types::{PlayerCreateRequest, PlayerResponse, PlayerStatsResponse},
};
use crate::{game::repository::GameRepository, shared::AppError};

/// Service for handling player roster business logic
pub struct PlayerService {
    repository: Arc<dyn PlayerRepository + Send + Sync>,
    game_repository: Arc<dyn GameRepository + Send + Sync>,
}

impl PlayerService {
    pub fn new(
        repository: Arc<dyn PlayerRepository + Send + Sync>,
        game_repository: Arc<dyn GameRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            game_repository,
        }
    }

    /// Registers a new player under a trimmed, unique name
    #[instrument(skip(self))]
    pub async fn register(&self, request: PlayerCreateRequest) -> Result<PlayerResponse, AppError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::Validation("Player name must not be empty".to_string()));
        }

        let player = PlayerModel::new(name);
        self.repository.create_player(&player).await?;

        info!(name = %player.name, "Player registered");
        Ok(player.into())
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<PlayerResponse>, AppError> {
        let roster = self.repository.list_players().await?;
        Ok(roster.into_iter().map(PlayerResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn stats(&self, name: &str) -> Result<PlayerStatsResponse, AppError> {
        let player = self
            .repository
            .get_player(name)
            .await?
            .ok_or_else(|| AppError::NotFound("Player not found".to_string()))?;
        Ok(player.into())
    }

    /// Removes a player, refusing while any recorded game still names them
    #[instrument(skip(self))]
    pub async fn remove(&self, name: &str) -> Result<(), AppError> {
        let games = self.game_repository.list_games().await?;
        let referenced = games
            .iter()
            .any(|game| game.player_scores.iter().any(|ps| ps.player == name));
        if referenced {
            debug!(name = %name, "Refusing to delete player referenced by games");
            return Err(AppError::Validation(
                "Player appears in recorded games and cannot be deleted".to_string(),
            ));
        }

        self.repository.delete_player(name).await?;
        info!(name = %name, "Player deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::models::{GameModel, PlayerScore};
    use crate::game::position::FinishingPosition;
    use crate::game::repository::InMemoryGameRepository;
    use crate::player::repository::InMemoryPlayerRepository;
    use chrono::NaiveDate;

    fn service() -> (PlayerService, Arc<InMemoryPlayerRepository>, Arc<InMemoryGameRepository>) {
        let players = Arc::new(InMemoryPlayerRepository::new());
        let games = Arc::new(InMemoryGameRepository::new());
        (
            PlayerService::new(players.clone(), games.clone()),
            players,
            games,
        )
    }

    #[tokio::test]
    async fn register_trims_the_name() {
        let (service, repo, _) = service();
        let response = service
            .register(PlayerCreateRequest {
                name: "  Astrid  ".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.name, "Astrid");
        assert!(repo.get_player("Astrid").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn register_rejects_blank_names() {
        let (service, repo, _) = service();
        let result = service
            .register(PlayerCreateRequest {
                name: "   ".to_string(),
            })
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
        assert_eq!(repo.player_count(), 0);
    }

    #[tokio::test]
    async fn register_rejects_duplicates() {
        let (service, repo, _) = service();
        service
            .register(PlayerCreateRequest { name: "A".to_string() })
            .await
            .unwrap();
        let result = service
            .register(PlayerCreateRequest { name: "A".to_string() })
            .await;

        assert!(matches!(result.unwrap_err(), AppError::AlreadyExists(_)));
        assert_eq!(repo.player_count(), 1);
    }

    #[tokio::test]
    async fn stats_for_missing_player_is_not_found() {
        let (service, _, _) = service();
        let result = service.stats("nobody").await;
        assert!(matches!(result.unwrap_err(), AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn remove_refuses_player_referenced_by_a_game() {
        let (service, _, games) = service();
        service
            .register(PlayerCreateRequest { name: "A".to_string() })
            .await
            .unwrap();

        let game = GameModel::new(
            vec![
                PlayerScore::new("A", FinishingPosition::First),
                PlayerScore::new("B", FinishingPosition::Second),
                PlayerScore::new("C", FinishingPosition::Third),
                PlayerScore::new("D", FinishingPosition::Fourth),
            ],
            "Lawn 1".to_string(),
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        );
        games.create_game(&game).await.unwrap();

        let result = service.remove("A").await;
        assert!(matches!(result.unwrap_err(), AppError::Validation(_)));
        assert!(service.stats("A").await.is_ok());
    }

    #[tokio::test]
    async fn remove_deletes_unreferenced_player() {
        let (service, repo, _) = service();
        service
            .register(PlayerCreateRequest { name: "A".to_string() })
            .await
            .unwrap();

        service.remove("A").await.unwrap();
        assert_eq!(repo.player_count(), 0);
    }
}
