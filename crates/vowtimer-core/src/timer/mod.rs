mod engine;

pub use engine::{SessionTimer, TimerState};
