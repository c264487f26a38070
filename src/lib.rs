// Library crate for the croquet club score tracker
// This file exposes the public API for integration tests

pub mod game;
pub mod player;
pub mod router;
pub mod shared;
pub mod snapshot;
pub mod stats;

// Re-export commonly used types for easier access in tests
pub use game::{
    draft::GameDraft, models::GameModel, position::FinishingPosition,
    repository::GameRepository, validator::GameValidationError,
};
pub use player::{models::PlayerModel, repository::PlayerRepository};
pub use shared::{AppError, AppState};
pub use stats::{StatsAggregator, StatsPolicy};
