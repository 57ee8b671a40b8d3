//! The dashboard coordinator.
//!
//! Owns the one countdown and a handle to the record store. When a work
//! countdown expires it appends the session and recomputes the productivity
//! metrics before returning, so no caller ever reads stale metrics after a
//! completion.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::events::Event;
use crate::records::{Task, TimerSession};
use crate::stats::{
    timer_stats, weekly_summary, ProductivityEngine, ProductivityMetrics, TimerStats,
    WeeklySummary,
};
use crate::storage::{Config, Store};
use crate::timer::{CountdownTimer, TimerCategory, TimerPreset};

/// What a natural work-countdown expiry produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSession {
    pub event: Event,
    pub session: TimerSession,
    pub metrics: ProductivityMetrics,
}

pub struct Dashboard<S, Tz: TimeZone> {
    store: S,
    config: Config,
    tz: Tz,
    timer: CountdownTimer,
}

impl<S, Tz> Dashboard<S, Tz>
where
    S: Store<Task> + Store<TimerSession>,
    Tz: TimeZone,
{
    /// A dashboard with an idle work countdown of the configured length.
    pub fn new(store: S, config: Config, tz: Tz) -> Self {
        let timer = CountdownTimer::new(
            TimerCategory::Work,
            config.minutes_for(TimerPreset::Work),
        );
        Self {
            store,
            config,
            tz,
            timer,
        }
    }

    /// Replace the countdown, e.g. with one restored from a previous run.
    pub fn with_timer(mut self, timer: CountdownTimer) -> Self {
        self.timer = timer;
        self
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.timer.start_at(now)
    }

    pub fn pause_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.timer.pause_at(now)
    }

    /// Reset to `minutes`, or to the configured length of the preset last
    /// loaded when `None`.
    pub fn reset_at(&mut self, minutes: Option<u32>, now: DateTime<Utc>) -> Event {
        let minutes = minutes.unwrap_or_else(|| self.config.minutes_for(self.timer.preset()));
        self.timer.reset_at(minutes, now)
    }

    pub fn apply_preset_at(&mut self, preset: TimerPreset, now: DateTime<Utc>) -> Event {
        let minutes = self.config.minutes_for(preset);
        self.timer.apply_preset_at(preset, minutes, now)
    }

    /// One elapsed second.
    pub fn tick_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<CompletedSession>, CoreError> {
        match self.timer.tick_at(now) {
            Some(event) => self.record_completion(event),
            None => Ok(None),
        }
    }

    /// Catch up on every whole second since the last tick.
    pub fn advance_to(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Option<CompletedSession>, CoreError> {
        match self.timer.advance_to(now) {
            Some(event) => self.record_completion(event),
            None => Ok(None),
        }
    }

    fn record_completion(
        &mut self,
        event: Event,
    ) -> Result<Option<CompletedSession>, CoreError> {
        let Event::SessionCompleted { duration_min, at } = event else {
            return Ok(None);
        };
        let mut session = TimerSession::work(duration_min, at);
        session.id = Some(Store::<TimerSession>::add(&self.store, &session)?);
        tracing::info!(duration_min, "work session completed");

        let metrics = self.metrics_at(at)?;
        Ok(Some(CompletedSession {
            event,
            session,
            metrics,
        }))
    }

    // ── Queries ──────────────────────────────────────────────────────

    fn tasks(&self) -> Result<Vec<Task>, CoreError> {
        Ok(Store::<Task>::get_all(&self.store)?)
    }

    fn sessions(&self) -> Result<Vec<TimerSession>, CoreError> {
        Ok(Store::<TimerSession>::get_all(&self.store)?)
    }

    /// A scoring engine over the current store contents.
    pub fn engine(&self) -> Result<ProductivityEngine<Tz>, CoreError> {
        let engine = ProductivityEngine::new(&self.tasks()?, &self.sessions()?, self.tz.clone())
            .with_max_lookback_days(self.config.streak.max_lookback_days);
        Ok(engine)
    }

    pub fn metrics_at(&self, now: DateTime<Utc>) -> Result<ProductivityMetrics, CoreError> {
        Ok(self.engine()?.metrics_at(now, self.config.goals()))
    }

    pub fn timer_stats_at(&self, now: DateTime<Utc>) -> Result<TimerStats, CoreError> {
        Ok(timer_stats(&self.sessions()?, now, &self.tz))
    }

    pub fn weekly_summary_at(&self, now: DateTime<Utc>) -> Result<WeeklySummary, CoreError> {
        Ok(weekly_summary(&self.tasks()?, &self.sessions()?, now, &self.tz))
    }

    /// Open, unarchived tasks that have a deadline, soonest first.
    pub fn upcoming_deadlines(&self) -> Result<Vec<Task>, CoreError> {
        let mut tasks: Vec<Task> = self
            .tasks()?
            .into_iter()
            .filter(|t| t.deadline.is_some() && !t.completed && !t.archived)
            .collect();
        tasks.sort_by_key(|t| t.deadline);
        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use crate::timer::TimerState;
    use chrono::{Duration, NaiveDate};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap()
    }

    fn dashboard() -> Dashboard<Database, Utc> {
        Dashboard::new(Database::open_memory().unwrap(), Config::default(), Utc)
    }

    #[test]
    fn work_expiry_stores_session_and_recomputes() {
        let mut dash = dashboard().with_timer(CountdownTimer::new(TimerCategory::Work, 1));
        dash.start_at(t0());
        for i in 1..60 {
            assert!(dash.tick_at(t0() + Duration::seconds(i)).unwrap().is_none());
        }
        let done = dash.tick_at(t0() + Duration::seconds(60)).unwrap().unwrap();

        assert_eq!(done.session.duration_min, 1);
        assert!(done.session.id.is_some());
        // 0.5 time points + 5 session points.
        assert_eq!(done.metrics.daily_score, 6);
        assert_eq!(done.metrics.streak, 1);

        let stored: Vec<TimerSession> = dash.store().get_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(dash.timer().state(), TimerState::Idle);
    }

    #[test]
    fn break_expiry_stores_nothing() {
        let mut dash = dashboard();
        dash.apply_preset_at(TimerPreset::ShortBreak, t0());
        dash.start_at(t0());
        assert!(dash
            .advance_to(t0() + Duration::minutes(6))
            .unwrap()
            .is_none());
        assert_eq!(dash.timer().state(), TimerState::Idle);

        let stored: Vec<TimerSession> = dash.store().get_all().unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn reset_without_minutes_uses_config() {
        let mut config = Config::default();
        config.timer.work_minutes = 45;
        config.timer.short_break_minutes = 10;
        let mut dash = Dashboard::new(Database::open_memory().unwrap(), config, Utc);

        dash.reset_at(None, t0());
        assert_eq!(dash.timer().remaining_secs(), 45 * 60);

        dash.apply_preset_at(TimerPreset::ShortBreak, t0());
        dash.reset_at(None, t0());
        assert_eq!(dash.timer().remaining_secs(), 10 * 60);

        dash.reset_at(Some(3), t0());
        assert_eq!(dash.timer().remaining_secs(), 180);
    }

    #[test]
    fn reset_reloads_the_last_preset() {
        let mut dash = dashboard();
        dash.apply_preset_at(TimerPreset::LongBreak, t0());
        dash.reset_at(Some(2), t0());
        dash.reset_at(None, t0());
        assert_eq!(dash.timer().remaining_secs(), 15 * 60);

        dash.apply_preset_at(TimerPreset::Work, t0());
        dash.reset_at(None, t0());
        assert_eq!(dash.timer().remaining_secs(), 25 * 60);
    }

    #[test]
    fn zero_work_minutes_in_config_file_use_default() {
        let config: Config = toml::from_str("[timer]\nwork_minutes = 0\n").unwrap();
        let mut dash = Dashboard::new(Database::open_memory().unwrap(), config, Utc);
        assert_eq!(dash.timer().remaining_secs(), 25 * 60);

        dash.reset_at(None, t0());
        assert_eq!(dash.timer().remaining_secs(), 25 * 60);

        // A single tick must not complete (and store) an empty session.
        dash.start_at(t0());
        assert!(dash.tick_at(t0() + Duration::seconds(1)).unwrap().is_none());
        let stored: Vec<TimerSession> = dash.store().get_all().unwrap();
        assert!(stored.is_empty());
    }

    #[test]
    fn deadlines_skip_done_and_archived() {
        let dash = dashboard();
        let mut later = Task::new("later", t0());
        later.deadline = NaiveDate::from_ymd_opt(2024, 7, 1);
        let mut sooner = Task::new("sooner", t0());
        sooner.deadline = NaiveDate::from_ymd_opt(2024, 6, 20);
        let mut done = Task::new("done", t0());
        done.deadline = NaiveDate::from_ymd_opt(2024, 6, 16);
        done.complete(t0());
        let mut archived = Task::new("archived", t0());
        archived.deadline = NaiveDate::from_ymd_opt(2024, 6, 16);
        archived.archived = true;
        let undated = Task::new("undated", t0());

        for task in [&later, &sooner, &done, &archived, &undated] {
            dash.store().add(task).unwrap();
        }

        let titles: Vec<String> = dash
            .upcoming_deadlines()
            .unwrap()
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["sooner", "later"]);
    }
}
