pub mod config;
pub mod seed;
pub mod stats;

use vowtimer_core::{Config, Database};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Connect using `VOW_DATABASE_URL` with the configured time budget.
pub fn open_store(config: &Config) -> Result<Database, vowtimer_core::CoreError> {
    Database::from_env(config.storage_timeout())
}
