//! Log setup. The terminal UI owns stdout and stderr, so events go to
//! `<data_dir>/vow.log`.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vowtimer_core::storage::data_dir;

/// Filter directives, e.g. `VOW_LOG=vowtimer_core=debug`.
pub const LOG_ENV: &str = "VOW_LOG";

/// Install the global subscriber. Failure to open the log file leaves
/// logging disabled rather than stopping the program.
pub fn init() {
    let path = match data_dir() {
        Ok(dir) => dir.join("vow.log"),
        Err(_) => return,
    };
    let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(Mutex::new(file)),
        )
        .try_init();
}
