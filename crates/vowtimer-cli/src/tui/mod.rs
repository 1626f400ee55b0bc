//! Interactive terminal session.
//!
//! One tokio runtime drives everything: a blocking thread reads crossterm
//! input, store calls run on the blocking pool, and timer wake-ups are
//! delayed sends. All of them land in a single queue consumed by [`App`].

mod app;
mod form;
mod input;
mod screens;
mod tasks;
mod theme;

use std::sync::Arc;

use ratatui::DefaultTerminal;
use tokio::sync::mpsc::{self, UnboundedSender};
use vowtimer_core::{Config, Store};

use crate::commands::{open_store, CommandResult};
use app::{App, AppEvent, Effect, Settings};
use tasks::TaskRunner;
use theme::Theme;

/// Open the store, then hand the terminal to the UI until the user quits.
///
/// A missing or unreachable database fails before the terminal is touched.
pub fn run() -> CommandResult {
    let config = Config::load_or_default();
    let store: Arc<dyn Store> = Arc::new(open_store(&config)?);
    tracing::info!("starting terminal session");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut terminal = ratatui::init();
    let result = runtime.block_on(event_loop(&mut terminal, &config, store));
    ratatui::restore();

    match &result {
        Ok(()) => tracing::info!("terminal session ended"),
        Err(e) => tracing::error!(error = %e, "terminal session failed"),
    }
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    config: &Config,
    store: Arc<dyn Store>,
) -> CommandResult {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = TaskRunner::new(store, config.storage_timeout(), tx.clone());
    input::spawn(tx.clone());

    let mut app = App::new(Settings::from(config), Theme::from_config(&config.theme));
    let effects = app.start();
    if apply(effects, &runner, &tx) {
        return Ok(());
    }

    loop {
        terminal.draw(|frame| app.view(frame))?;

        let Some(event) = rx.recv().await else {
            break;
        };
        let effects = app.handle_event(&event);
        if apply(effects, &runner, &tx) {
            break;
        }
    }
    Ok(())
}

/// Run loop-level effects. Returns `true` when the app should exit.
fn apply(effects: Vec<Effect>, runner: &TaskRunner, tx: &UnboundedSender<AppEvent>) -> bool {
    for effect in effects {
        match effect {
            Effect::Spawn(task) => runner.spawn(task),
            Effect::Schedule { after, event } => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(event);
                });
            }
            Effect::Quit => return true,
            // Resolved by the router before reaching the loop.
            Effect::Navigate(_) | Effect::SetDisplayMode(_) => {}
        }
    }
    false
}
