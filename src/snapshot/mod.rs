pub mod handlers;
pub mod service;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::game::models::GameModel;
use crate::player::models::PlayerModel;

pub use handlers::{get_snapshot, put_snapshot};
pub use service::SnapshotService;
pub use store::{FileSnapshotStore, SnapshotStore};

/// The full tracker state as one document: the shape the cloud-sync
/// variant reads and writes wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerSnapshot {
    pub players: Vec<PlayerModel>,
    pub games: Vec<GameModel>,
}
