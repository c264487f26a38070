use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{service::SnapshotService, TrackerSnapshot};
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> SnapshotService {
    SnapshotService::new(
        Arc::clone(&state.player_repository),
        Arc::clone(&state.game_repository),
    )
}

/// HTTP handler for exporting the full tracker state
///
/// GET /snapshot
#[instrument(name = "get_snapshot", skip(state))]
pub async fn get_snapshot(
    State(state): State<AppState>,
) -> Result<Json<TrackerSnapshot>, AppError> {
    let snapshot = service(&state).export().await?;

    info!(
        player_count = snapshot.players.len(),
        game_count = snapshot.games.len(),
        "Snapshot exported"
    );
    Ok(Json(snapshot))
}

/// HTTP handler for importing a full tracker state wholesale
///
/// PUT /snapshot
/// Replaces the roster and the game log entirely; last writer wins
#[instrument(name = "put_snapshot", skip(state, snapshot))]
pub async fn put_snapshot(
    State(state): State<AppState>,
    Json(snapshot): Json<TrackerSnapshot>,
) -> Result<Json<serde_json::Value>, AppError> {
    service(&state).import(snapshot).await?;
    Ok(Json(serde_json::json!({ "message": "Snapshot imported" })))
}
