pub mod config;
pub mod repositories;
pub mod services;
pub mod wiring;

pub use config::*;
pub use repositories::*;
pub use services::*;
pub use wiring::*;
