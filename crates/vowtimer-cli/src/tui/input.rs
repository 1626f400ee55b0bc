use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc::UnboundedSender;

use super::app::AppEvent;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Forward terminal input into the event queue from a dedicated thread.
///
/// The thread exits once the queue is closed.
pub fn spawn(tx: UnboundedSender<AppEvent>) {
    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(POLL_INTERVAL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "input polling failed");
                    break;
                }
            }
            let forwarded = match event::read() {
                // Windows reports releases too.
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(Event::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(error = %e, "reading input failed");
                    break;
                }
            };
            if tx.send(forwarded).is_err() {
                break;
            }
        }
    });
}
