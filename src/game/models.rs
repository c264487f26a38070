use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::position::FinishingPosition;

/// One player's result within a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player: String,
    pub position: FinishingPosition,
}

impl PlayerScore {
    pub fn new(player: impl Into<String>, position: FinishingPosition) -> Self {
        Self {
            player: player.into(),
            position,
        }
    }
}

/// Database model for the games table
///
/// A game is an event: four players, their finishing ranks, where it was
/// played and when. `game_date` is the day the game happened on the lawn;
/// `timestamp` is when the record entered the store and never changes,
/// even across edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameModel {
    pub id: String, // UUID v4 as string
    pub player_scores: Vec<PlayerScore>,
    pub location: String,
    pub game_date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

impl GameModel {
    /// Creates a new game record with generated ID and creation timestamp
    pub fn new(player_scores: Vec<PlayerScore>, location: String, game_date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            player_scores,
            location,
            game_date,
            timestamp: Utc::now(),
        }
    }

    /// The finishing position recorded for the named player, if present
    pub fn position_of(&self, player: &str) -> Option<FinishingPosition> {
        self.player_scores
            .iter()
            .find(|ps| ps.player == player)
            .map(|ps| ps.position)
    }

    pub fn involves(&self, player: &str) -> bool {
        self.player_scores.iter().any(|ps| ps.player == player)
    }
}
