//! # Vowtimer Core Library
//!
//! Core logic for the vow timer: a single-purpose focus countdown whose
//! outcome (kept or abandoned) is recorded and folded into day streaks.
//! The `vow` binary is a thin terminal layer over this crate.
//!
//! ## Architecture
//!
//! - **Timer**: a tick-driven state machine. The caller delivers one tick per
//!   second while the session runs; every command returns an optional [`Event`]
//! - **Stats**: day streaks over completed sessions plus store aggregates
//! - **Storage**: the [`Store`] trait with its SQLite implementation, TOML
//!   configuration and built-in seed data
//! - **Content**: quotes and Old English poems with built-in fallbacks
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Core timer state machine
//! - [`Database`]: Session, subject and content persistence
//! - [`Config`]: Application configuration management
//! - [`SessionStats`]: Totals and streaks for display

pub mod content;
pub mod error;
pub mod events;
pub mod stats;
pub mod storage;
pub mod timer;

pub use content::{load_content, Content, DisplayMode};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use events::{Event, SessionOutcome};
pub use stats::{calculate_streaks, SessionStats, Streaks};
pub use storage::{Config, Database, Store};
pub use timer::{SessionTimer, TimerState};
