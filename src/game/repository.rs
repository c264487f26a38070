use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::{GameModel, PlayerScore};
use crate::shared::AppError;

/// Trait for game repository operations
#[async_trait]
pub trait GameRepository {
    async fn create_game(&self, game: &GameModel) -> Result<(), AppError>;
    async fn get_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError>;

    /// Lists all games, newest first by creation timestamp
    async fn list_games(&self) -> Result<Vec<GameModel>, AppError>;

    /// Replaces a stored game wholesale, keyed by its id.
    /// The creation timestamp of the stored record is preserved.
    async fn update_game(&self, game: &GameModel) -> Result<(), AppError>;

    async fn delete_game(&self, game_id: &str) -> Result<(), AppError>;

    /// Replaces the whole game log wholesale (snapshot import, last writer wins)
    async fn replace_all(&self, games: Vec<GameModel>) -> Result<(), AppError>;
}

/// In-memory implementation of GameRepository for development and testing
pub struct InMemoryGameRepository {
    games: Mutex<HashMap<String, GameModel>>,
}

impl Default for InMemoryGameRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryGameRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            games: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the current number of stored games
    pub fn game_count(&self) -> usize {
        self.games.lock().unwrap().len()
    }
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    #[instrument(skip(self, game))]
    async fn create_game(&self, game: &GameModel) -> Result<(), AppError> {
        debug!(game_id = %game.id, location = %game.location, "Creating game in memory");

        let mut games = self.games.lock().unwrap();
        if games.contains_key(&game.id) {
            warn!(game_id = %game.id, "Game already exists in memory");
            return Err(AppError::AlreadyExists("Game already exists".to_string()));
        }
        games.insert(game.id.clone(), game.clone());

        debug!(game_id = %game.id, "Game created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError> {
        debug!(game_id = %game_id, "Fetching game from memory");

        let games = self.games.lock().unwrap();
        Ok(games.get(game_id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_games(&self) -> Result<Vec<GameModel>, AppError> {
        debug!("Listing all games in memory");

        let games = self.games.lock().unwrap();
        let mut log: Vec<GameModel> = games.values().cloned().collect();
        log.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(log)
    }

    #[instrument(skip(self, game))]
    async fn update_game(&self, game: &GameModel) -> Result<(), AppError> {
        debug!(game_id = %game.id, "Updating game in memory");

        let mut games = self.games.lock().unwrap();
        let stored = games.get_mut(&game.id).ok_or_else(|| {
            warn!(game_id = %game.id, "Game not found for update in memory");
            AppError::NotFound("Game not found".to_string())
        })?;

        // Creation timestamp is immutable across edits
        let timestamp = stored.timestamp;
        *stored = game.clone();
        stored.timestamp = timestamp;

        debug!(game_id = %game.id, "Game updated successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, game_id: &str) -> Result<(), AppError> {
        debug!(game_id = %game_id, "Deleting game from memory");

        let mut games = self.games.lock().unwrap();
        if games.remove(game_id).is_none() {
            warn!(game_id = %game_id, "Game not found for deletion");
            return Err(AppError::NotFound("Game not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, games))]
    async fn replace_all(&self, games: Vec<GameModel>) -> Result<(), AppError> {
        debug!(game_count = games.len(), "Replacing game log wholesale in memory");

        let mut map = HashMap::new();
        for game in games {
            map.insert(game.id.clone(), game);
        }
        *self.games.lock().unwrap() = map;
        Ok(())
    }
}

/// PostgreSQL implementation of game repository
///
/// `player_scores` is stored as a JSONB column: a game's four entries are
/// only ever read and written together.
pub struct PostgresGameRepository {
    pool: PgPool,
}

impl PostgresGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_game(row: &sqlx::postgres::PgRow) -> Result<GameModel, AppError> {
    let player_scores: Vec<PlayerScore> =
        serde_json::from_value(row.get::<serde_json::Value, _>("player_scores")).map_err(|e| {
            warn!(error = %e, "Failed to decode player_scores column");
            AppError::DatabaseError(e.to_string())
        })?;

    Ok(GameModel {
        id: row.get("id"),
        player_scores,
        location: row.get("location"),
        game_date: row.get("game_date"),
        timestamp: row.get("timestamp"),
    })
}

fn scores_to_json(scores: &[PlayerScore]) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(scores).map_err(|e| {
        warn!(error = %e, "Failed to encode player_scores column");
        AppError::DatabaseError(e.to_string())
    })
}

#[async_trait]
impl GameRepository for PostgresGameRepository {
    #[instrument(skip(self, game))]
    async fn create_game(&self, game: &GameModel) -> Result<(), AppError> {
        debug!(game_id = %game.id, location = %game.location, "Creating game in database");

        sqlx::query(
            "INSERT INTO games (id, player_scores, location, game_date, timestamp) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&game.id)
        .bind(scores_to_json(&game.player_scores)?)
        .bind(&game.location)
        .bind(game.game_date)
        .bind(game.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create game in database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(game_id = %game.id, "Game created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_game(&self, game_id: &str) -> Result<Option<GameModel>, AppError> {
        debug!(game_id = %game_id, "Fetching game from database");

        let row = sqlx::query(
            "SELECT id, player_scores, location, game_date, timestamp \
             FROM games WHERE id = $1",
        )
        .bind(game_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, game_id = %game_id, "Failed to fetch game from database");
            AppError::DatabaseError(e.to_string())
        })?;

        row.as_ref().map(row_to_game).transpose()
    }

    #[instrument(skip(self))]
    async fn list_games(&self) -> Result<Vec<GameModel>, AppError> {
        debug!("Listing all games from database");

        let rows = sqlx::query(
            "SELECT id, player_scores, location, game_date, timestamp \
             FROM games ORDER BY timestamp DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list games from database");
            AppError::DatabaseError(e.to_string())
        })?;

        rows.iter().map(row_to_game).collect()
    }

    #[instrument(skip(self, game))]
    async fn update_game(&self, game: &GameModel) -> Result<(), AppError> {
        debug!(game_id = %game.id, "Updating game in database");

        // Timestamp is deliberately not in the SET list
        let result = sqlx::query(
            "UPDATE games SET player_scores = $2, location = $3, game_date = $4 WHERE id = $1",
        )
        .bind(&game.id)
        .bind(scores_to_json(&game.player_scores)?)
        .bind(&game.location)
        .bind(game.game_date)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, game_id = %game.id, "Failed to update game in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(game_id = %game.id, "Game not found for update");
            return Err(AppError::NotFound("Game not found".to_string()));
        }

        debug!(game_id = %game.id, "Game updated successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_game(&self, game_id: &str) -> Result<(), AppError> {
        debug!(game_id = %game_id, "Deleting game from database");

        let result = sqlx::query("DELETE FROM games WHERE id = $1")
            .bind(game_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, game_id = %game_id, "Failed to delete game from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(game_id = %game_id, "Game not found for deletion");
            return Err(AppError::NotFound("Game not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self, games))]
    async fn replace_all(&self, games: Vec<GameModel>) -> Result<(), AppError> {
        debug!(game_count = games.len(), "Replacing game log wholesale in database");

        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin game replace transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        sqlx::query("DELETE FROM games")
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to clear games table");
                AppError::DatabaseError(e.to_string())
            })?;

        for game in &games {
            sqlx::query(
                "INSERT INTO games (id, player_scores, location, game_date, timestamp) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&game.id)
            .bind(scores_to_json(&game.player_scores)?)
            .bind(&game.location)
            .bind(game.game_date)
            .bind(game.timestamp)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, game_id = %game.id, "Failed to insert game during replace");
                AppError::DatabaseError(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit game replace transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
