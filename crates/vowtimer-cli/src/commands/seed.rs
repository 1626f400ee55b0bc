use vowtimer_core::storage::seed::seed;
use vowtimer_core::Config;

use super::{open_store, CommandResult};

pub fn run() -> CommandResult {
    let config = Config::load_or_default();
    let db = open_store(&config)?;
    let summary = seed(&db)?;

    println!(
        "added {} subjects, {} quotes, {} poems ({} already present)",
        summary.subjects_added, summary.quotes_added, summary.poems_added, summary.skipped
    );
    Ok(())
}
