pub mod database;
pub mod history_repository;
pub mod leaderboard_repository;
pub mod resource_repository;
pub mod rows;
pub mod session_repository;
pub mod user_repository;

pub use database::*;
pub use history_repository::*;
pub use leaderboard_repository::*;
pub use resource_repository::SqliteResourceRepository;
pub use session_repository::*;
pub use user_repository::*;
