use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::PlayerService,
    types::{PlayerCreateRequest, PlayerResponse, PlayerStatsResponse},
};
use crate::shared::{AppError, AppState};

/// HTTP handler for listing the roster
///
/// GET /players
/// Returns all registered players sorted by name
#[instrument(name = "list_players", skip(state))]
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlayerResponse>>, AppError> {
    let service = PlayerService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.game_repository),
    );
    let roster = service.list().await?;

    info!(player_count = roster.len(), "Players listed successfully");
    Ok(Json(roster))
}

/// HTTP handler for registering a player
///
/// POST /players
/// Returns the new player, or 400 if the name is blank or taken
#[instrument(name = "create_player", skip(state))]
pub async fn create_player(
    State(state): State<AppState>,
    Json(request): Json<PlayerCreateRequest>,
) -> Result<(StatusCode, Json<PlayerResponse>), AppError> {
    info!(name = %request.name, "Registering new player");

    let service = PlayerService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.game_repository),
    );
    let player = service.register(request).await?;

    Ok((StatusCode::CREATED, Json(player)))
}

/// HTTP handler for a player's aggregate statistics
///
/// GET /players/{name}/stats
#[instrument(name = "get_player_stats", skip(state))]
pub async fn get_player_stats(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PlayerStatsResponse>, AppError> {
    let service = PlayerService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.game_repository),
    );
    let stats = service.stats(&name).await?;
    Ok(Json(stats))
}

/// HTTP handler for removing a player
///
/// DELETE /players/{name}
/// Fails with 400 while any recorded game still names the player
#[instrument(name = "delete_player", skip(state))]
pub async fn delete_player(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let service = PlayerService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.game_repository),
    );
    service.remove(&name).await?;

    Ok(Json(serde_json::json!({ "message": "Player deleted" })))
}
