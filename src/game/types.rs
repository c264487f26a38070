use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::models::{GameModel, PlayerScore};

/// Request body for recording a new game
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameCreateRequest {
    pub player_scores: Vec<PlayerScore>,
    pub location: String,
    pub game_date: NaiveDate,
}

/// Request body for editing a game: the scores, location and date are
/// replaced wholesale, the creation timestamp is kept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameUpdateRequest {
    pub player_scores: Vec<PlayerScore>,
    pub location: String,
    pub game_date: NaiveDate,
}

/// Game as returned by the games endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct GameResponse {
    pub id: String,
    pub player_scores: Vec<PlayerScore>,
    pub location: String,
    pub game_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl From<GameModel> for GameResponse {
    fn from(game: GameModel) -> Self {
        Self {
            id: game.id,
            player_scores: game.player_scores,
            location: game.location,
            game_date: game.game_date,
            timestamp: game.timestamp,
        }
    }
}
