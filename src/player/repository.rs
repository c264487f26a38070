use async_trait::async_trait;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::{debug, instrument, warn};

use super::models::PlayerModel;
use crate::game::position::FinishingPosition;
use crate::shared::AppError;

/// A single stat mutation for one player, applied as part of a batch.
#[derive(Debug, Clone)]
pub struct StatChange {
    pub player: String,
    pub kind: StatChangeKind,
}

#[derive(Debug, Clone, Copy)]
pub enum StatChangeKind {
    /// Fold a newly recorded finishing position into the player's aggregate
    Record(FinishingPosition),
    /// Remove a previously recorded finishing position from the aggregate
    Erase(FinishingPosition),
}

impl StatChange {
    pub fn record(player: impl Into<String>, position: FinishingPosition) -> Self {
        Self {
            player: player.into(),
            kind: StatChangeKind::Record(position),
        }
    }

    pub fn erase(player: impl Into<String>, position: FinishingPosition) -> Self {
        Self {
            player: player.into(),
            kind: StatChangeKind::Erase(position),
        }
    }
}

/// Trait for player repository operations
#[async_trait]
pub trait PlayerRepository {
    async fn create_player(&self, player: &PlayerModel) -> Result<(), AppError>;
    async fn get_player(&self, name: &str) -> Result<Option<PlayerModel>, AppError>;

    /// Lists all players sorted by name ascending
    async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError>;

    async fn delete_player(&self, name: &str) -> Result<(), AppError>;

    /// Atomically applies a batch of stat changes.
    ///
    /// Either every change in the batch lands or none does: recording one game
    /// touches four players and a partially applied batch would leave the
    /// aggregates inconsistent with the game log. Fails with NotFound if any
    /// named player is missing, without applying anything.
    async fn apply_stat_changes(&self, changes: &[StatChange]) -> Result<(), AppError>;

    /// Replaces the whole roster wholesale (snapshot import, last writer wins)
    async fn replace_all(&self, players: Vec<PlayerModel>) -> Result<(), AppError>;
}

/// In-memory implementation of PlayerRepository for development and testing
///
/// Data is stored in memory and lost when the application restarts.
pub struct InMemoryPlayerRepository {
    players: Mutex<HashMap<String, PlayerModel>>,
}

impl Default for InMemoryPlayerRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlayerRepository {
    /// Creates a new empty in-memory repository
    pub fn new() -> Self {
        Self {
            players: Mutex::new(HashMap::new()),
        }
    }

    /// Creates an in-memory repository with a pre-populated roster
    pub fn with_players(players: Vec<PlayerModel>) -> Self {
        let mut map = HashMap::new();
        for player in players {
            map.insert(player.name.clone(), player);
        }
        Self {
            players: Mutex::new(map),
        }
    }

    /// Returns the current roster size
    pub fn player_count(&self) -> usize {
        self.players.lock().unwrap().len()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    #[instrument(skip(self, player))]
    async fn create_player(&self, player: &PlayerModel) -> Result<(), AppError> {
        debug!(name = %player.name, "Creating player in memory");

        let mut players = self.players.lock().unwrap();
        if players.contains_key(&player.name) {
            warn!(name = %player.name, "Player already exists in memory");
            return Err(AppError::AlreadyExists("Player already exists".to_string()));
        }
        players.insert(player.name.clone(), player.clone());

        debug!(name = %player.name, "Player created successfully in memory");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_player(&self, name: &str) -> Result<Option<PlayerModel>, AppError> {
        debug!(name = %name, "Fetching player from memory");

        let players = self.players.lock().unwrap();
        Ok(players.get(name).cloned())
    }

    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError> {
        debug!("Listing all players in memory");

        let players = self.players.lock().unwrap();
        let mut roster: Vec<PlayerModel> = players.values().cloned().collect();
        roster.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roster)
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, name: &str) -> Result<(), AppError> {
        debug!(name = %name, "Deleting player from memory");

        let mut players = self.players.lock().unwrap();
        if players.remove(name).is_none() {
            warn!(name = %name, "Player not found for deletion");
            return Err(AppError::NotFound("Player not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self, changes))]
    async fn apply_stat_changes(&self, changes: &[StatChange]) -> Result<(), AppError> {
        debug!(change_count = changes.len(), "Applying stat changes in memory");

        // One lock for the whole batch: verify first, then mutate, so a
        // missing player cannot leave the batch half-applied.
        let mut players = self.players.lock().unwrap();

        for change in changes {
            if !players.contains_key(&change.player) {
                warn!(name = %change.player, "Stat change names unknown player");
                return Err(AppError::NotFound(format!(
                    "Player not found: {}",
                    change.player
                )));
            }
        }

        for change in changes {
            let player = players
                .get_mut(&change.player)
                .ok_or(AppError::Internal)?;
            match change.kind {
                StatChangeKind::Record(position) => player.record_position(position),
                StatChangeKind::Erase(position) => player.erase_position(position),
            }
        }

        debug!(change_count = changes.len(), "Stat changes applied in memory");
        Ok(())
    }

    #[instrument(skip(self, players))]
    async fn replace_all(&self, players: Vec<PlayerModel>) -> Result<(), AppError> {
        debug!(player_count = players.len(), "Replacing roster wholesale in memory");

        let mut map = HashMap::new();
        for player in players {
            map.insert(player.name.clone(), player);
        }
        *self.players.lock().unwrap() = map;
        Ok(())
    }
}

/// PostgreSQL implementation of player repository
pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_player(row: &sqlx::postgres::PgRow) -> PlayerModel {
    PlayerModel {
        name: row.get("name"),
        created_at: row.get("created_at"),
        total_games: row.get::<i32, _>("total_games") as u32,
        wins: row.get::<i32, _>("wins") as u32,
        average_position: row.get("average_position"),
    }
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    #[instrument(skip(self, player))]
    async fn create_player(&self, player: &PlayerModel) -> Result<(), AppError> {
        debug!(name = %player.name, "Creating player in database");

        let result = sqlx::query(
            "INSERT INTO players (name, created_at, total_games, wins, average_position) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (name) DO NOTHING",
        )
        .bind(&player.name)
        .bind(player.created_at)
        .bind(player.total_games as i32)
        .bind(player.wins as i32)
        .bind(player.average_position)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create player in database");
            AppError::DatabaseError(e.to_string())
        })?;

        if result.rows_affected() == 0 {
            warn!(name = %player.name, "Player already exists in database");
            return Err(AppError::AlreadyExists("Player already exists".to_string()));
        }

        debug!(name = %player.name, "Player created successfully in database");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_player(&self, name: &str) -> Result<Option<PlayerModel>, AppError> {
        debug!(name = %name, "Fetching player from database");

        let row = sqlx::query(
            "SELECT name, created_at, total_games, wins, average_position \
             FROM players WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, name = %name, "Failed to fetch player from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(row.as_ref().map(row_to_player))
    }

    #[instrument(skip(self))]
    async fn list_players(&self) -> Result<Vec<PlayerModel>, AppError> {
        debug!("Listing all players from database");

        let rows = sqlx::query(
            "SELECT name, created_at, total_games, wins, average_position \
             FROM players ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list players from database");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(rows.iter().map(row_to_player).collect())
    }

    #[instrument(skip(self))]
    async fn delete_player(&self, name: &str) -> Result<(), AppError> {
        debug!(name = %name, "Deleting player from database");

        let result = sqlx::query("DELETE FROM players WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, name = %name, "Failed to delete player from database");
                AppError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            warn!(name = %name, "Player not found for deletion");
            return Err(AppError::NotFound("Player not found".to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self, changes))]
    async fn apply_stat_changes(&self, changes: &[StatChange]) -> Result<(), AppError> {
        debug!(change_count = changes.len(), "Applying stat changes in database");

        // One transaction for the whole batch; each change is a single
        // conditional UPDATE so concurrent recordings against the same player
        // serialize at the row instead of losing updates.
        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin stats transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        for change in changes {
            let result = match change.kind {
                StatChangeKind::Record(position) => {
                    sqlx::query(
                        "UPDATE players SET \
                           total_games = total_games + 1, \
                           wins = wins + $2, \
                           average_position = (average_position * total_games + $3) / (total_games + 1) \
                         WHERE name = $1",
                    )
                    .bind(&change.player)
                    .bind(if position.is_win() { 1i32 } else { 0i32 })
                    .bind(position.rank() as f64)
                    .execute(&mut *tx)
                    .await
                }
                StatChangeKind::Erase(position) => {
                    sqlx::query(
                        "UPDATE players SET \
                           total_games = total_games - 1, \
                           wins = wins - $2, \
                           average_position = CASE WHEN total_games <= 1 THEN 0 \
                             ELSE (average_position * total_games - $3) / (total_games - 1) END \
                         WHERE name = $1 AND total_games > 0",
                    )
                    .bind(&change.player)
                    .bind(if position.is_win() { 1i32 } else { 0i32 })
                    .bind(position.rank() as f64)
                    .execute(&mut *tx)
                    .await
                }
            };

            let result = result.map_err(|e| {
                warn!(error = %e, name = %change.player, "Failed to apply stat change");
                AppError::DatabaseError(e.to_string())
            })?;

            if result.rows_affected() == 0 {
                warn!(name = %change.player, "Stat change names unknown player");
                // Dropping the transaction rolls back the earlier changes
                return Err(AppError::NotFound(format!(
                    "Player not found: {}",
                    change.player
                )));
            }
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit stats transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(change_count = changes.len(), "Stat changes applied in database");
        Ok(())
    }

    #[instrument(skip(self, players))]
    async fn replace_all(&self, players: Vec<PlayerModel>) -> Result<(), AppError> {
        debug!(player_count = players.len(), "Replacing roster wholesale in database");

        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to begin roster replace transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        sqlx::query("DELETE FROM players")
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to clear players table");
                AppError::DatabaseError(e.to_string())
            })?;

        for player in &players {
            sqlx::query(
                "INSERT INTO players (name, created_at, total_games, wins, average_position) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&player.name)
            .bind(player.created_at)
            .bind(player.total_games as i32)
            .bind(player.wins as i32)
            .bind(player.average_position)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, name = %player.name, "Failed to insert player during replace");
                AppError::DatabaseError(e.to_string())
            })?;
        }

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit roster replace transaction");
            AppError::DatabaseError(e.to_string())
        })?;

        Ok(())
    }
}
