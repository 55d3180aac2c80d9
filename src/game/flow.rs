//! Timed step scheduling
//!
//! The reveal sequence and the pre-game countdown both run off deadlines in
//! milliseconds. Nothing here owns a real timer; the shell feeds the clock
//! in once per frame, which keeps every sequence testable with a virtual
//! clock and makes cancellation a plain drop.

use crate::consts::{COUNTDOWN_FROM, COUNTDOWN_STEP_MS};
use crate::game::events::CountdownStep;
use crate::game::tile::CharacterId;

/// A deferred board step
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Drop the overlay and show off a matched character
    Reveal { character: CharacterId, found: u32 },
    /// Put the overlay back up after a reveal
    RestoreOverlay,
    /// Present the level-complete panel
    ShowCompletion,
    /// Fade the completion panel contents in
    FadeCompletion,
}

#[derive(Debug, Clone)]
struct TimedStep {
    at: f64,
    step: Step,
}

/// Deadline-ordered queue of pending steps. Steps sharing a deadline drain
/// in the order they were scheduled.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<TimedStep>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `step` to fire at the absolute time `at` (ms)
    pub fn schedule(&mut self, at: f64, step: Step) {
        self.pending.push(TimedStep { at, step });
    }

    /// Remove and return every step due by `now`, in deadline order
    pub fn due(&mut self, now: f64) -> Vec<Step> {
        if self.pending.is_empty() {
            return Vec::new();
        }
        // stable sort keeps scheduling order for equal deadlines
        self.pending.sort_by(|a, b| a.at.total_cmp(&b.at));
        let split = self
            .pending
            .iter()
            .position(|pending| pending.at > now)
            .unwrap_or(self.pending.len());
        self.pending.drain(..split).map(|timed| timed.step).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Pre-game countdown: one beat per second, counting down to "GO!", then a
/// final beat that retires the start screen. Owns its whole lifecycle, so
/// dropping it cancels the remainder.
#[derive(Debug, Clone)]
pub struct Countdown {
    started_at: f64,
    beats: u32,
    done: bool,
}

impl Countdown {
    pub fn start(now: f64) -> Self {
        Self {
            started_at: now,
            beats: 0,
            done: false,
        }
    }

    /// Beats that became due since the last tick, oldest first
    pub fn tick(&mut self, now: f64) -> Vec<CountdownStep> {
        let mut steps = Vec::new();
        while !self.done {
            let next_at = self.started_at + (self.beats + 1) as f64 * COUNTDOWN_STEP_MS;
            if now < next_at {
                break;
            }
            self.beats += 1;
            if self.beats <= COUNTDOWN_FROM {
                steps.push(CountdownStep::Count(COUNTDOWN_FROM + 1 - self.beats));
            } else if self.beats == COUNTDOWN_FROM + 1 {
                steps.push(CountdownStep::Go);
            } else {
                self.done = true;
                steps.push(CountdownStep::Done);
            }
        }
        steps
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}
