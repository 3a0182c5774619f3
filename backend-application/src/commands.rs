pub mod auth_commands;
pub mod bulk_import_commands;
pub mod history_commands;
pub mod privacy_commands;
pub mod resource_commands;
