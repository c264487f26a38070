use chrono::NaiveDate;
use std::collections::HashMap;

use super::models::PlayerScore;
use super::position::FinishingPosition;
use super::types::GameCreateRequest;
use super::validator::{GameValidationError, PLAYERS_PER_GAME};

/// Builder used by the recording flow to assign the four finishing
/// positions interactively before a game is committed.
///
/// Assignment is last-writer-wins: giving a position to one player evicts
/// whoever held it, and re-assigning a player frees their old position.
/// (An earlier revision silently ignored clicks on a taken position
/// instead; that behavior made dead clicks and was dropped.)
#[derive(Debug, Default, Clone)]
pub struct GameDraft {
    assignments: HashMap<String, FinishingPosition>,
    location: String,
    game_date: Option<NaiveDate>,
}

impl GameDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns a finishing position to a player, evicting any previous
    /// holder of that position and dropping the player's old position.
    pub fn assign(&mut self, player: impl Into<String>, position: FinishingPosition) {
        let player = player.into();
        self.assignments
            .retain(|name, held| *name == player || *held != position);
        self.assignments.insert(player, position);
    }

    /// Removes a player's assignment, if any
    pub fn clear(&mut self, player: &str) {
        self.assignments.remove(player);
    }

    /// The position currently held by the player, if any
    pub fn position_of(&self, player: &str) -> Option<FinishingPosition> {
        self.assignments.get(player).copied()
    }

    /// Positions the player could take: all four minus those held by
    /// *other* players. The player's own position stays selectable.
    pub fn available_positions(&self, player: &str) -> Vec<FinishingPosition> {
        FinishingPosition::ALL
            .into_iter()
            .filter(|position| {
                !self
                    .assignments
                    .iter()
                    .any(|(name, held)| name != player && held == position)
            })
            .collect()
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn set_game_date(&mut self, game_date: NaiveDate) {
        self.game_date = Some(game_date);
    }

    /// True once four players hold the four positions and location and
    /// game date are filled in. Submission stays disabled until then.
    pub fn is_complete(&self) -> bool {
        self.assignments.len() == PLAYERS_PER_GAME
            && !self.location.trim().is_empty()
            && self.game_date.is_some()
    }

    /// Converts a completed draft into a create request
    pub fn into_request(self) -> Result<GameCreateRequest, GameValidationError> {
        if self.assignments.len() != PLAYERS_PER_GAME {
            return Err(GameValidationError::InvalidPlayerCount {
                actual: self.assignments.len(),
            });
        }
        if self.location.trim().is_empty() {
            return Err(GameValidationError::MissingField("location"));
        }
        let game_date = self
            .game_date
            .ok_or(GameValidationError::MissingField("game date"))?;

        let mut player_scores: Vec<PlayerScore> = self
            .assignments
            .into_iter()
            .map(|(player, position)| PlayerScore { player, position })
            .collect();
        player_scores.sort_by_key(|ps| ps.position);

        Ok(GameCreateRequest {
            player_scores,
            location: self.location,
            game_date,
        })
    }
}
