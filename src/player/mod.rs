pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;

pub use handlers::{create_player, delete_player, get_player_stats, list_players};
pub use service::PlayerService;
