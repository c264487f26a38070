use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{game, player, snapshot, shared::AppState};

/// Builds the full application router. Kept out of `main` so integration
/// tests can drive the same routes without a socket.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            get(|| async { axum::Json(serde_json::json!({ "message": "Holbæk Kroket Klub API" })) }),
        )
        .route(
            "/players",
            get(player::list_players).post(player::create_player),
        )
        .route("/players/:name/stats", get(player::get_player_stats))
        .route("/players/:name", delete(player::delete_player))
        .route("/games", get(game::list_games).post(game::create_game))
        .route(
            "/games/:id",
            put(game::update_game).delete(game::delete_game),
        )
        .route(
            "/snapshot",
            get(snapshot::get_snapshot).put(snapshot::put_snapshot),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
