use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    service::GameService,
    types::{GameCreateRequest, GameResponse, GameUpdateRequest},
};
use crate::shared::{AppError, AppState};

fn service(state: &AppState) -> GameService {
    GameService::new(
        Arc::clone(&state.game_repository),
        Arc::clone(&state.player_repository),
    )
}

/// HTTP handler for listing the game log
///
/// GET /games
/// Returns all recorded games, newest first
#[instrument(name = "list_games", skip(state))]
pub async fn list_games(
    State(state): State<AppState>,
) -> Result<Json<Vec<GameResponse>>, AppError> {
    let log = service(&state).list().await?;

    info!(game_count = log.len(), "Games listed successfully");
    Ok(Json(log))
}

/// HTTP handler for recording a game
///
/// POST /games
/// Validates the four player/position pairs, persists the game and updates
/// every involved player's stats before acknowledging
#[instrument(name = "create_game", skip(state, request))]
pub async fn create_game(
    State(state): State<AppState>,
    Json(request): Json<GameCreateRequest>,
) -> Result<(StatusCode, Json<GameResponse>), AppError> {
    info!(location = %request.location, "Recording new game");

    let game = service(&state).record(request).await?;
    Ok((StatusCode::CREATED, Json(game)))
}

/// HTTP handler for editing a game wholesale
///
/// PUT /games/{id}
#[instrument(name = "update_game", skip(state, request))]
pub async fn update_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
    Json(request): Json<GameUpdateRequest>,
) -> Result<Json<GameResponse>, AppError> {
    info!(game_id = %game_id, "Editing game");

    let game = service(&state).edit(&game_id, request).await?;
    Ok(Json(game))
}

/// HTTP handler for deleting a game
///
/// DELETE /games/{id}
#[instrument(name = "delete_game", skip(state))]
pub async fn delete_game(
    State(state): State<AppState>,
    Path(game_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    info!(game_id = %game_id, "Deleting game");

    service(&state).remove(&game_id).await?;
    Ok(Json(serde_json::json!({ "message": "Game deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::models::PlayerScore;
    use crate::game::position::FinishingPosition;
    use crate::player::models::PlayerModel;
    use crate::player::repository::InMemoryPlayerRepository;
    use crate::shared::test_utils::AppStateBuilder;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        let players = Arc::new(InMemoryPlayerRepository::with_players(
            ["A", "B", "C", "D"]
                .iter()
                .map(|name| PlayerModel::new(name.to_string()))
                .collect(),
        ));
        let state = AppStateBuilder::new()
            .with_player_repository(players)
            .build_in_memory();

        Router::new()
            .route("/games", axum::routing::get(list_games).post(create_game))
            .route(
                "/games/:id",
                axum::routing::put(update_game).delete(delete_game),
            )
            .with_state(state)
    }

    fn game_body(ranks: [(&str, u8); 4]) -> String {
        let scores: Vec<serde_json::Value> = ranks
            .iter()
            .map(|(player, position)| {
                serde_json::json!({ "player": player, "position": position })
            })
            .collect();
        serde_json::json!({
            "player_scores": scores,
            "location": "Lawn 1",
            "game_date": "2024-06-01"
        })
        .to_string()
    }

    fn post_game(body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/games")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_game_handler() {
        let app = app();

        let response = app
            .oneshot(post_game(game_body([
                ("A", 1),
                ("B", 2),
                ("C", 3),
                ("D", 4),
            ])))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let game: GameResponse = serde_json::from_slice(&body).unwrap();
        assert!(!game.id.is_empty());
        assert_eq!(game.location, "Lawn 1");
        assert_eq!(
            game.player_scores[0],
            PlayerScore::new("A", FinishingPosition::First)
        );
    }

    #[tokio::test]
    async fn test_create_game_handler_rejects_duplicate_positions() {
        let app = app();

        let response = app
            .oneshot(post_game(game_body([
                ("A", 1),
                ("B", 1),
                ("C", 3),
                ("D", 4),
            ])))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_game_handler_rejects_out_of_range_position() {
        let app = app();

        // position 5 fails FinishingPosition deserialization
        let response = app
            .oneshot(post_game(game_body([
                ("A", 1),
                ("B", 2),
                ("C", 3),
                ("D", 5),
            ])))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_game_handler_rejects_unknown_player() {
        let app = app();

        let response = app
            .oneshot(post_game(game_body([
                ("A", 1),
                ("B", 2),
                ("C", 3),
                ("Ghost", 4),
            ])))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_games_handler_empty() {
        let app = app();

        let request = Request::builder()
            .method("GET")
            .uri("/games")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let log: Vec<GameResponse> = serde_json::from_slice(&body).unwrap();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_update_game_handler_not_found() {
        let app = app();

        let request = Request::builder()
            .method("PUT")
            .uri("/games/missing-id")
            .header("content-type", "application/json")
            .body(Body::from(game_body([
                ("A", 1),
                ("B", 2),
                ("C", 3),
                ("D", 4),
            ])))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_game_handler_not_found() {
        let app = app();

        let request = Request::builder()
            .method("DELETE")
            .uri("/games/missing-id")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
