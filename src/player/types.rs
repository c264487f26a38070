use serde::{Deserialize, Serialize};

use super::models::PlayerModel;

/// Request body for registering a new player
#[derive(Debug, Deserialize)]
pub struct PlayerCreateRequest {
    pub name: String,
}

/// Player as returned by the roster endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerResponse {
    pub name: String,
    pub total_games: u32,
    pub wins: u32,
    pub average_position: f64,
}

impl From<PlayerModel> for PlayerResponse {
    fn from(player: PlayerModel) -> Self {
        Self {
            name: player.name,
            total_games: player.total_games,
            wins: player.wins,
            average_position: player.average_position,
        }
    }
}

/// Per-player statistics summary for the stats endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct PlayerStatsResponse {
    pub name: String,
    pub total_games: u32,
    pub wins: u32,
    pub average_position: f64,
    pub win_percentage: f64,
}

impl From<PlayerModel> for PlayerStatsResponse {
    fn from(player: PlayerModel) -> Self {
        let win_percentage = player.win_percentage();
        Self {
            name: player.name,
            total_games: player.total_games,
            wins: player.wins,
            average_position: player.average_position,
            win_percentage,
        }
    }
}
