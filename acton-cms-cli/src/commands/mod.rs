//! CLI command implementations

pub mod migrate;
pub mod rollback;
pub mod routes;
pub mod scaffold;

pub use migrate::MigrateCommand;
pub use rollback::RollbackCommand;
pub use routes::RoutesCommand;
pub use scaffold::ScaffoldCommand;
