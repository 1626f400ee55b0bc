//! Session timer state machine.
//!
//! The timer does not own a clock or a thread. The caller delivers one
//! `tick()` per elapsed second while the timer is `Running`, and stops
//! delivering them otherwise.
//!
//! ## State Transitions
//!
//! ```text
//! Running <-> Paused
//! Running | Paused -> ConfirmingAbandon -> Running   (no)
//!                                       -> Complete  (yes, abandoned)
//! Running -> Complete                                 (countdown hit zero)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new(25, subject.id, &subject.name);
//! // once per second while timer.is_running():
//! if let Some(event) = timer.tick() {
//!     // SessionFinished
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::events::{Event, SessionOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerState {
    Running,
    Paused,
    /// The user asked to quit and has not answered yet. Ticking is suspended.
    ConfirmingAbandon,
    /// Terminal. The outcome has been emitted.
    Complete,
}

/// Countdown for a single focus session.
///
/// `remaining_secs` never leaves `0..=total_secs`, and exactly one
/// `SessionFinished` event is produced over the timer's lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionTimer {
    subject_id: i64,
    subject_name: String,
    total_secs: u64,
    remaining_secs: u64,
    state: TimerState,
    started_at: DateTime<Utc>,
    /// Set when the outcome was an abandonment.
    #[serde(default)]
    abandoned: bool,
}

impl SessionTimer {
    /// Start a session of `duration_min` minutes. The timer begins `Running`.
    pub fn new(duration_min: u64, subject_id: i64, subject_name: impl Into<String>) -> Self {
        let total_secs = duration_min.saturating_mul(60);
        Self {
            subject_id,
            subject_name: subject_name.into(),
            total_secs,
            remaining_secs: total_secs,
            state: TimerState::Running,
            started_at: Utc::now(),
            abandoned: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Complete
    }

    /// True once finished through a confirmed abandon.
    pub fn was_abandoned(&self) -> bool {
        self.abandoned
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn duration_min(&self) -> u64 {
        self.total_secs / 60
    }

    pub fn subject_id(&self) -> i64 {
        self.subject_id
    }

    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// 0.0 .. 100.0 of the countdown already elapsed.
    pub fn percent_complete(&self) -> f64 {
        if self.total_secs == 0 {
            return 100.0;
        }
        let elapsed = self.total_secs - self.remaining_secs;
        elapsed as f64 / self.total_secs as f64 * 100.0
    }

    /// Build a full state snapshot event for renderers.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            subject_name: self.subject_name.clone(),
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            percent_complete: self.percent_complete(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Advance the countdown by one second.
    ///
    /// Only a `Running` timer moves. When the countdown reaches zero the
    /// timer completes and `SessionFinished { completed: true }` is returned.
    pub fn tick(&mut self) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            return Some(self.finish(true));
        }
        None
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn resume(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Paused => {
                self.state = TimerState::Running;
                Some(Event::TimerResumed {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Spacebar behaviour: pause a running timer, resume a paused one.
    pub fn toggle_pause(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => self.pause(),
            TimerState::Paused => self.resume(),
            _ => None,
        }
    }

    /// Ask to quit. Suspends ticking until the user answers.
    pub fn request_abandon(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running | TimerState::Paused => {
                self.state = TimerState::ConfirmingAbandon;
                Some(Event::AbandonRequested {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// "yes": the session ends as abandoned, whatever time was left.
    pub fn confirm_abandon(&mut self) -> Option<Event> {
        match self.state {
            TimerState::ConfirmingAbandon => Some(self.finish(false)),
            _ => None,
        }
    }

    /// "no": back to `Running` with the remaining time untouched.
    pub fn cancel_abandon(&mut self) -> Option<Event> {
        match self.state {
            TimerState::ConfirmingAbandon => {
                self.state = TimerState::Running;
                Some(Event::AbandonCancelled {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    /// Restore the full duration and run. Ignored while confirming or finished.
    pub fn reset(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running | TimerState::Paused => {
                self.remaining_secs = self.total_secs;
                self.state = TimerState::Running;
                Some(Event::TimerReset {
                    total_secs: self.total_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(&mut self, completed: bool) -> Event {
        self.state = TimerState::Complete;
        self.abandoned = !completed;
        Event::SessionFinished {
            outcome: SessionOutcome {
                completed,
                subject_id: self.subject_id,
                subject_name: self.subject_name.clone(),
                duration_min: self.duration_min(),
                started_at: self.started_at,
            },
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn timer(minutes: u64) -> SessionTimer {
        SessionTimer::new(minutes, 7, "Reading")
    }

    fn completed_flag(event: &Event) -> bool {
        event.outcome().expect("expected SessionFinished").completed
    }

    #[test]
    fn fresh_timer_is_running_with_full_duration() {
        let t = timer(25);
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.total_secs(), 1500);
        assert_eq!(t.remaining_secs(), 1500);
        assert_eq!(t.percent_complete(), 0.0);
    }

    #[test]
    fn tick_decrements_by_one() {
        let mut t = timer(1);
        assert!(t.tick().is_none());
        assert_eq!(t.remaining_secs(), 59);
        assert_eq!(t.state(), TimerState::Running);
    }

    #[test]
    fn last_tick_completes_exactly_once() {
        let mut t = timer(1);
        for _ in 0..59 {
            assert!(t.tick().is_none());
        }
        assert_eq!(t.remaining_secs(), 1);

        let event = t.tick().expect("final tick emits outcome");
        assert!(completed_flag(&event));
        assert_eq!(t.state(), TimerState::Complete);
        assert_eq!(t.remaining_secs(), 0);

        assert!(t.tick().is_none());
        assert!(t.toggle_pause().is_none());
        assert!(t.reset().is_none());
        assert!(t.request_abandon().is_none());
    }

    #[test]
    fn zero_minute_timer_completes_on_first_tick() {
        let mut t = timer(0);
        assert_eq!(t.remaining_secs(), 0);
        let event = t.tick().expect("zero-length countdown finishes");
        assert!(completed_flag(&event));
    }

    #[test]
    fn paused_timer_ignores_ticks() {
        let mut t = timer(1);
        t.tick();
        assert!(t.pause().is_some());
        assert!(t.tick().is_none());
        assert!(t.tick().is_none());
        assert_eq!(t.remaining_secs(), 59);
    }

    #[test]
    fn pause_then_resume_keeps_remaining() {
        let mut t = timer(2);
        t.tick();
        t.tick();
        let before = t.remaining_secs();
        t.pause();
        t.resume();
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.remaining_secs(), before);
    }

    #[test]
    fn toggle_flips_between_running_and_paused() {
        let mut t = timer(1);
        t.toggle_pause();
        assert_eq!(t.state(), TimerState::Paused);
        t.toggle_pause();
        assert_eq!(t.state(), TimerState::Running);
    }

    #[test]
    fn invalid_inputs_are_ignored() {
        let mut t = timer(1);
        assert!(t.resume().is_none());
        assert!(t.confirm_abandon().is_none());
        assert!(t.cancel_abandon().is_none());
        t.pause();
        assert!(t.pause().is_none());
    }

    #[test]
    fn confirm_abandon_emits_abandoned_outcome() {
        let mut t = timer(25);
        t.tick();
        assert!(t.request_abandon().is_some());
        assert_eq!(t.state(), TimerState::ConfirmingAbandon);
        assert!(t.tick().is_none());

        let event = t.confirm_abandon().unwrap();
        assert!(!completed_flag(&event));
        assert_eq!(event.outcome().unwrap().duration_min, 25);
        assert!(t.is_finished());
        assert!(t.was_abandoned());
    }

    #[test]
    fn abandon_from_paused_is_allowed() {
        let mut t = timer(5);
        t.pause();
        assert!(t.request_abandon().is_some());
        assert_eq!(t.state(), TimerState::ConfirmingAbandon);
    }

    #[test]
    fn cancel_abandon_returns_to_running() {
        let mut t = timer(5);
        t.pause();
        t.request_abandon();
        let remaining = t.remaining_secs();
        assert!(t.cancel_abandon().is_some());
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.remaining_secs(), remaining);
    }

    #[test]
    fn reset_restores_full_duration_and_runs() {
        let mut t = timer(1);
        for _ in 0..10 {
            t.tick();
        }
        t.pause();
        assert!(t.reset().is_some());
        assert_eq!(t.remaining_secs(), 60);
        assert_eq!(t.state(), TimerState::Running);
    }

    #[test]
    fn reset_ignored_while_confirming() {
        let mut t = timer(1);
        t.tick();
        t.request_abandon();
        assert!(t.reset().is_none());
        assert_eq!(t.remaining_secs(), 59);
    }

    #[test]
    fn snapshot_reports_progress() {
        let mut t = timer(1);
        for _ in 0..30 {
            t.tick();
        }
        match t.snapshot() {
            Event::StateSnapshot {
                state,
                remaining_secs,
                total_secs,
                percent_complete,
                ..
            } => {
                assert_eq!(state, TimerState::Running);
                assert_eq!(remaining_secs, 30);
                assert_eq!(total_secs, 60);
                assert!((percent_complete - 50.0).abs() < f64::EPSILON);
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[derive(Debug, Clone)]
    enum Input {
        Tick,
        Toggle,
        Quit,
        Yes,
        No,
        Reset,
    }

    fn input() -> impl Strategy<Value = Input> {
        prop_oneof![
            6 => Just(Input::Tick),
            1 => Just(Input::Toggle),
            1 => Just(Input::Quit),
            1 => Just(Input::Yes),
            1 => Just(Input::No),
            1 => Just(Input::Reset),
        ]
    }

    proptest! {
        #[test]
        fn fresh_timer_total_matches_minutes(minutes in 0u64..10_000) {
            let t = timer(minutes);
            prop_assert_eq!(t.total_secs(), minutes * 60);
            prop_assert_eq!(t.remaining_secs(), minutes * 60);
        }

        #[test]
        fn remaining_stays_in_bounds_and_outcome_fires_once(
            minutes in 0u64..3,
            inputs in proptest::collection::vec(input(), 0..400),
        ) {
            let mut t = timer(minutes);
            let mut outcomes = 0;
            for i in inputs {
                let event = match i {
                    Input::Tick => t.tick(),
                    Input::Toggle => t.toggle_pause(),
                    Input::Quit => t.request_abandon(),
                    Input::Yes => t.confirm_abandon(),
                    Input::No => t.cancel_abandon(),
                    Input::Reset => t.reset(),
                };
                if event.as_ref().and_then(Event::outcome).is_some() {
                    outcomes += 1;
                }
                prop_assert!(t.remaining_secs() <= t.total_secs());
            }
            prop_assert!(outcomes <= 1);
            prop_assert_eq!(outcomes == 1, t.is_finished());
        }
    }
}
