// Domain services: pure business rules with no I/O
pub mod bulk_diff;
pub mod points;
pub mod quantity;

pub use bulk_diff::*;
pub use points::*;
pub use quantity::*;
