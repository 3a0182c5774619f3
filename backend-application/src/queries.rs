pub mod activity_queries;
pub mod history_queries;
pub mod leaderboard_queries;
pub mod privacy_queries;
pub mod resource_queries;
pub mod role_queries;
pub mod session_queries;
pub mod user_queries;
