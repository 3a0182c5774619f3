// Port traits implemented by the infrastructure layer
// Persistence and Discord access are injected behind these interfaces

pub mod repositories;
pub mod services;

pub use repositories::*;
pub use services::*;
