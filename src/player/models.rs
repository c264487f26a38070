use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::game::position::FinishingPosition;

/// Database model for the players table
///
/// The name doubles as the identity key: the club is small enough that
/// case-sensitive unique names are the natural identifier, matching how
/// score sheets are kept on paper.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PlayerModel {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub total_games: u32,
    pub wins: u32,
    pub average_position: f64,
}

impl PlayerModel {
    /// Creates a fresh player with zeroed stats. The caller is responsible
    /// for trimming and validating the name first.
    pub fn new(name: String) -> Self {
        Self {
            name,
            created_at: Utc::now(),
            total_games: 0,
            wins: 0,
            average_position: 0.0,
        }
    }

    /// Folds one finishing position into the running aggregate.
    ///
    /// Online-mean update: equivalent to recomputing the mean over the full
    /// history with this result appended.
    pub fn record_position(&mut self, position: FinishingPosition) {
        let old_total = self.total_games as f64;
        self.total_games += 1;
        if position.is_win() {
            self.wins += 1;
        }
        self.average_position =
            (self.average_position * old_total + position.rank() as f64) / self.total_games as f64;
    }

    /// Removes one previously recorded finishing position from the aggregate.
    ///
    /// Inverse of [`record_position`](Self::record_position). Saturates at
    /// zeroed stats rather than underflowing if called against a player that
    /// never had the result applied.
    pub fn erase_position(&mut self, position: FinishingPosition) {
        if self.total_games == 0 {
            return;
        }
        let old_total = self.total_games as f64;
        self.total_games -= 1;
        if position.is_win() {
            self.wins = self.wins.saturating_sub(1);
        }
        if self.total_games == 0 {
            self.average_position = 0.0;
        } else {
            self.average_position = (self.average_position * old_total
                - position.rank() as f64)
                / self.total_games as f64;
        }
    }

    pub fn win_percentage(&self) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        let raw = self.wins as f64 / self.total_games as f64 * 100.0;
        // One decimal, matching the stats endpoint contract
        (raw * 10.0).round() / 10.0
    }
}
