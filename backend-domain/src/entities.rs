// Domain entities
pub mod bulk_import;
pub mod config;
pub mod history;
pub mod leaderboard;
pub mod resource;
pub mod role_config;
pub mod user;

pub use bulk_import::*;
pub use config::*;
pub use history::*;
pub use leaderboard::*;
pub use resource::*;
pub use role_config::*;
pub use user::*;
