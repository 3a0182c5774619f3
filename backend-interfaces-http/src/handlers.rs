pub mod auth_handlers;
pub mod bulk_handlers;
pub mod history_handlers;
pub mod leaderboard_handlers;
pub mod ops_handlers;
pub mod resource_handlers;
pub mod role_handlers;
pub mod user_handlers;

pub use auth_handlers::*;
pub use bulk_handlers::*;
pub use history_handlers::*;
pub use leaderboard_handlers::*;
pub use ops_handlers::*;
pub use resource_handlers::*;
pub use role_handlers::*;
pub use user_handlers::*;
