use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kroket::game::repository::InMemoryGameRepository;
use kroket::player::repository::InMemoryPlayerRepository;
use kroket::router::build_router;
use kroket::shared::AppState;
use kroket::snapshot::{FileSnapshotStore, SnapshotService};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kroket=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting croquet club score tracker");

    // Create shared application state with dependency injection
    // Easy to switch between implementations:
    let player_repository = Arc::new(InMemoryPlayerRepository::new());
    let game_repository = Arc::new(InMemoryGameRepository::new());

    // For production with PostgreSQL:
    // let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    // let pool = sqlx::PgPool::connect(&database_url).await.expect("Failed to connect to database");
    // let player_repository = Arc::new(PostgresPlayerRepository::new(pool.clone()));
    // let game_repository = Arc::new(PostgresGameRepository::new(pool));

    // The in-memory repositories can be seeded from a snapshot blob so the
    // dev server survives restarts
    if let Ok(path) = std::env::var("KROKET_SNAPSHOT_PATH") {
        let store = FileSnapshotStore::new(path.clone());
        let service = SnapshotService::new(player_repository.clone(), game_repository.clone());
        match service.restore_from(&store).await {
            Ok(true) => info!(path = %path, "Restored state from snapshot blob"),
            Ok(false) => info!(path = %path, "No snapshot blob found, starting empty"),
            Err(err) => tracing::error!(error = %err, path = %path, "Failed to restore snapshot"),
        }
    }

    let app_state = AppState::new(player_repository, game_repository);
    let app = build_router(app_state);

    // run our app with hyper, listening globally on port 3000
    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
    info!("Server running on http://localhost:3000");
    axum::serve(listener, app).await.unwrap();
}
