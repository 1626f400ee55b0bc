use chrono::Local;
use vowtimer_core::{Config, SessionStats};

use super::{open_store, CommandResult};

pub fn run() -> CommandResult {
    let config = Config::load_or_default();
    let db = open_store(&config)?;
    let stats = SessionStats::collect(&db, Local::now().date_naive())?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
