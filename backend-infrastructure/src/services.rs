pub mod cache_janitor;
pub mod discord_service;
pub mod health_service;

pub use cache_janitor::*;
pub use discord_service::*;
pub use health_service::*;
