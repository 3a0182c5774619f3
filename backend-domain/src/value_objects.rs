// Domain value objects
pub mod action_type;
pub mod change_type;
pub mod location;
pub mod resource_status;
pub mod time_filter;

pub use action_type::*;
pub use change_type::*;
pub use location::*;
pub use resource_status::*;
pub use time_filter::*;
