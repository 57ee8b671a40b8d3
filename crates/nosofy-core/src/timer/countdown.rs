//! Countdown timer state machine.
//!
//! The timer owns no thread or interval. The caller drives it with one
//! `tick_at()` per elapsed second (see [`super::Ticker`]), or with
//! `advance_to()` when resuming a persisted timer in a later process.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused -> Running)* -> Idle
//! ```
//!
//! Invalid transitions are no-ops that return `None`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::events::Event;
use crate::records::SessionKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerCategory {
    #[default]
    Work,
    Break,
}

impl From<TimerCategory> for SessionKind {
    fn from(category: TimerCategory) -> Self {
        match category {
            TimerCategory::Work => SessionKind::Work,
            TimerCategory::Break => SessionKind::Break,
        }
    }
}

/// The three dashboard duration presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimerPreset {
    #[default]
    Work,
    ShortBreak,
    LongBreak,
}

impl TimerPreset {
    pub fn category(&self) -> TimerCategory {
        match self {
            TimerPreset::Work => TimerCategory::Work,
            TimerPreset::ShortBreak | TimerPreset::LongBreak => TimerCategory::Break,
        }
    }

    /// Minutes used when no (or a zero) duration is configured.
    pub fn default_minutes(&self) -> u32 {
        match self {
            TimerPreset::Work => 25,
            TimerPreset::ShortBreak => 5,
            TimerPreset::LongBreak => 15,
        }
    }
}

/// A single countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTimer {
    state: TimerState,
    category: TimerCategory,
    /// The preset last loaded; a plain reset reloads its length.
    #[serde(default)]
    preset: TimerPreset,
    remaining_secs: u64,
    /// Wall-clock instant of the most recent `start_at()`.
    #[serde(default)]
    started_at: Option<DateTime<Utc>>,
    /// Instant of the last applied tick (or of the start).
    #[serde(default)]
    last_tick_at: Option<DateTime<Utc>>,
}

impl Default for CountdownTimer {
    fn default() -> Self {
        Self::new(TimerCategory::Work, TimerPreset::Work.default_minutes())
    }
}

impl CountdownTimer {
    /// An idle timer holding `minutes` of the given category.
    pub fn new(category: TimerCategory, minutes: u32) -> Self {
        let preset = match category {
            TimerCategory::Work => TimerPreset::Work,
            TimerCategory::Break => TimerPreset::ShortBreak,
        };
        Self {
            state: TimerState::Idle,
            category,
            preset,
            remaining_secs: u64::from(minutes) * 60,
            started_at: None,
            last_tick_at: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn category(&self) -> TimerCategory {
        self.category
    }

    pub fn preset(&self) -> TimerPreset {
        self.preset
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// `MM:SS` rendering of the remaining time.
    pub fn display(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_secs / 60,
            self.remaining_secs % 60
        )
    }

    pub fn snapshot(&self) -> Event {
        self.snapshot_at(Utc::now())
    }

    pub fn snapshot_at(&self, at: DateTime<Utc>) -> Event {
        Event::StateSnapshot {
            state: self.state,
            category: self.category,
            remaining_secs: self.remaining_secs,
            display: self.display(),
            at,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Running => None,
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                self.started_at = Some(now);
                self.last_tick_at = Some(now);
                Some(Event::TimerStarted {
                    category: self.category,
                    remaining_secs: self.remaining_secs,
                    at: now,
                })
            }
        }
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                self.last_tick_at = None;
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: now,
                })
            }
            _ => None,
        }
    }

    /// Valid from any state. Stops the countdown and loads `minutes`.
    pub fn reset_at(&mut self, minutes: u32, now: DateTime<Utc>) -> Event {
        self.state = TimerState::Idle;
        self.started_at = None;
        self.last_tick_at = None;
        self.remaining_secs = u64::from(minutes) * 60;
        Event::TimerReset {
            category: self.category,
            remaining_secs: self.remaining_secs,
            at: now,
        }
    }

    /// Switch category and reset to the preset duration.
    ///
    /// `minutes == 0` falls back to the preset default.
    pub fn apply_preset_at(
        &mut self,
        preset: TimerPreset,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Event {
        let minutes = if minutes == 0 {
            preset.default_minutes()
        } else {
            minutes
        };
        self.category = preset.category();
        self.preset = preset;
        self.reset_at(minutes, now)
    }

    /// One elapsed second. Returns `SessionCompleted` when a work
    /// countdown reaches zero; break expiry returns `None`.
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        self.last_tick_at = Some(now);
        if self.remaining_secs > 0 {
            return None;
        }

        self.state = TimerState::Idle;
        self.last_tick_at = None;
        let started_at = self.started_at.take();
        match self.category {
            TimerCategory::Work => Some(Event::SessionCompleted {
                duration_min: session_minutes(started_at, now),
                at: now,
            }),
            TimerCategory::Break => None,
        }
    }

    /// Apply one tick per whole second elapsed since the last tick.
    ///
    /// Stops as soon as the countdown expires and returns the expiry event.
    pub fn advance_to(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running {
            return None;
        }
        let last = self.last_tick_at?;
        let elapsed = (now - last).num_seconds();
        for i in 1..=elapsed {
            let event = self.tick_at(last + Duration::seconds(i));
            if event.is_some() || self.state != TimerState::Running {
                return event;
            }
        }
        None
    }
}

/// Whole minutes between `started_at` and `now`, rounded to nearest.
fn session_minutes(started_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
    let Some(started_at) = started_at else {
        return 0;
    };
    let millis = (now - started_at).num_milliseconds().max(0);
    (millis as f64 / 60_000.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap()
    }

    #[test]
    fn start_pause_start() {
        let mut timer = CountdownTimer::default();
        assert_eq!(timer.state(), TimerState::Idle);

        assert!(timer.start_at(t0()).is_some());
        assert_eq!(timer.state(), TimerState::Running);

        assert!(timer.pause_at(t0()).is_some());
        assert_eq!(timer.state(), TimerState::Paused);
        assert_eq!(timer.remaining_secs(), 25 * 60);

        assert!(timer.start_at(t0()).is_some());
        assert_eq!(timer.state(), TimerState::Running);
    }

    #[test]
    fn invalid_transitions_are_noops() {
        let mut timer = CountdownTimer::default();
        assert!(timer.pause_at(t0()).is_none());
        assert!(timer.tick_at(t0()).is_none());
        assert_eq!(timer.remaining_secs(), 25 * 60);
    }

    #[test]
    fn second_start_does_not_double_tick() {
        let mut timer = CountdownTimer::new(TimerCategory::Work, 1);
        assert!(timer.start_at(t0()).is_some());
        assert!(timer.start_at(t0()).is_none());
        timer.tick_at(t0() + Duration::seconds(1));
        assert_eq!(timer.remaining_secs(), 59);
    }

    #[test]
    fn work_expiry_emits_one_session_completed() {
        let mut timer = CountdownTimer::new(TimerCategory::Work, 0);
        // One second left; the tick lands 25 minutes after the start.
        timer.remaining_secs = 1;
        timer.start_at(t0());

        let event = timer.tick_at(t0() + Duration::minutes(25));
        assert_eq!(
            event,
            Some(Event::SessionCompleted {
                duration_min: 25,
                at: t0() + Duration::minutes(25),
            })
        );
        assert_eq!(timer.state(), TimerState::Idle);
        assert!(timer.tick_at(t0() + Duration::minutes(26)).is_none());
    }

    #[test]
    fn break_expiry_emits_nothing() {
        let mut timer = CountdownTimer::new(TimerCategory::Break, 0);
        timer.remaining_secs = 1;
        timer.start_at(t0());
        assert!(timer.tick_at(t0() + Duration::seconds(1)).is_none());
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn session_minutes_round_to_nearest() {
        assert_eq!(session_minutes(Some(t0()), t0() + Duration::seconds(89)), 1);
        assert_eq!(session_minutes(Some(t0()), t0() + Duration::seconds(90)), 2);
        assert_eq!(session_minutes(Some(t0()), t0() - Duration::seconds(5)), 0);
        assert_eq!(session_minutes(None, t0()), 0);
    }

    #[test]
    fn reset_while_running_stops_ticking() {
        let mut timer = CountdownTimer::default();
        timer.start_at(t0());
        timer.reset_at(10, t0());
        assert_eq!(timer.state(), TimerState::Idle);
        assert_eq!(timer.remaining_secs(), 600);
        assert!(timer.tick_at(t0() + Duration::seconds(1)).is_none());
        assert_eq!(timer.remaining_secs(), 600);
    }

    #[test]
    fn apply_preset_switches_category() {
        let mut timer = CountdownTimer::default();
        timer.apply_preset_at(TimerPreset::LongBreak, 0, t0());
        assert_eq!(timer.category(), TimerCategory::Break);
        assert_eq!(timer.preset(), TimerPreset::LongBreak);
        assert_eq!(timer.remaining_secs(), 15 * 60);

        timer.apply_preset_at(TimerPreset::Work, 50, t0());
        assert_eq!(timer.category(), TimerCategory::Work);
        assert_eq!(timer.remaining_secs(), 50 * 60);
    }

    #[test]
    fn advance_to_applies_elapsed_seconds() {
        let mut timer = CountdownTimer::new(TimerCategory::Work, 1);
        timer.start_at(t0());
        assert!(timer.advance_to(t0() + Duration::seconds(20)).is_none());
        assert_eq!(timer.remaining_secs(), 40);

        let event = timer.advance_to(t0() + Duration::minutes(10));
        assert!(matches!(
            event,
            Some(Event::SessionCompleted { duration_min: 1, .. })
        ));
        assert_eq!(timer.state(), TimerState::Idle);
    }

    #[test]
    fn display_pads_minutes_and_seconds() {
        let mut timer = CountdownTimer::new(TimerCategory::Work, 5);
        assert_eq!(timer.display(), "05:00");
        timer.remaining_secs = 61;
        assert_eq!(timer.display(), "01:01");
    }

    #[test]
    fn serde_roundtrip_keeps_running_state() {
        let mut timer = CountdownTimer::default();
        timer.start_at(t0());
        let json = serde_json::to_string(&timer).unwrap();
        let restored: CountdownTimer = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.state(), TimerState::Running);
        assert_eq!(restored.remaining_secs(), 25 * 60);
    }
}
