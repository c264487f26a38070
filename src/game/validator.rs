use std::collections::HashSet;
use thiserror::Error;

use super::models::PlayerScore;
use super::position::FinishingPosition;
use crate::shared::AppError;

pub const PLAYERS_PER_GAME: usize = 4;

/// Reasons a game is rejected before it can touch the store or any stats
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameValidationError {
    #[error("a game needs exactly {PLAYERS_PER_GAME} players, got {actual}")]
    InvalidPlayerCount { actual: usize },

    #[error("player {0} appears more than once")]
    DuplicatePlayer(String),

    #[error("finishing positions must be a permutation of 1-4")]
    InvalidPosition,

    #[error("player {0} is not registered")]
    UnknownPlayer(String),

    #[error("{0} must not be empty")]
    MissingField(&'static str),
}

impl From<GameValidationError> for AppError {
    fn from(err: GameValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

/// Checks the shape of a game: exactly four distinct players holding the
/// four distinct finishing ranks, and a non-blank location.
///
/// Positions are required to be a permutation of {1,2,3,4}. An old revision
/// of the tracker allowed repeated "points" in that range; ranks that repeat
/// make no sense for a finishing order, so that reading is rejected here.
pub fn validate_game_shape(
    player_scores: &[PlayerScore],
    location: &str,
) -> Result<(), GameValidationError> {
    if player_scores.len() != PLAYERS_PER_GAME {
        return Err(GameValidationError::InvalidPlayerCount {
            actual: player_scores.len(),
        });
    }

    let mut seen_players = HashSet::new();
    for score in player_scores {
        if !seen_players.insert(score.player.as_str()) {
            return Err(GameValidationError::DuplicatePlayer(score.player.clone()));
        }
    }

    let positions: HashSet<FinishingPosition> =
        player_scores.iter().map(|ps| ps.position).collect();
    if positions.len() != PLAYERS_PER_GAME {
        return Err(GameValidationError::InvalidPosition);
    }

    if location.trim().is_empty() {
        return Err(GameValidationError::MissingField("location"));
    }

    Ok(())
}

/// Checks that every named player exists in the given roster
pub fn validate_players_registered<'a>(
    player_scores: &[PlayerScore],
    roster: impl IntoIterator<Item = &'a str>,
) -> Result<(), GameValidationError> {
    let registered: HashSet<&str> = roster.into_iter().collect();
    for score in player_scores {
        if !registered.contains(score.player.as_str()) {
            return Err(GameValidationError::UnknownPlayer(score.player.clone()));
        }
    }
    Ok(())
}
