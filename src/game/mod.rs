pub mod draft;
pub mod handlers;
pub mod models;
pub mod position;
pub mod repository;
pub mod service;
pub mod types;
pub mod validator;

pub use handlers::{create_game, delete_game, list_games, update_game};
pub use service::GameService;
