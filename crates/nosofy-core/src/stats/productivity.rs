//! Daily productivity score, weekly average and activity streak.
//!
//! Everything here is a pure function of the task and session collections,
//! an "as of" calendar day and the time zone that defines calendar days.
//! Nothing in this module fails: missing completion timestamps simply never
//! match a day, and empty inputs produce zero scores.
//!
//! A day's score is built from three capped components:
//!
//! | component | rule                         | cap |
//! |-----------|------------------------------|-----|
//! | tasks     | 10 per completed task        | 40  |
//! | time      | 1 per 2 focused minutes      | 40  |
//! | sessions  | 5 per timer session          | 20  |

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{Task, TimerSession};

const TASK_POINTS: f64 = 10.0;
const TASK_CAP: f64 = 40.0;
const MINUTES_PER_POINT: f64 = 2.0;
const TIME_CAP: f64 = 40.0;
const SESSION_POINTS: f64 = 5.0;
const SESSION_CAP: f64 = 20.0;

/// Days averaged by [`ProductivityEngine::weekly_average`].
pub const WEEK_DAYS: u64 = 7;
/// Default bound on the backward streak walk.
pub const DEFAULT_MAX_LOOKBACK_DAYS: u32 = 365;

/// Raw activity counted on one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayActivity {
    pub completed_tasks: u32,
    pub sessions: u32,
    pub focus_minutes: u64,
}

impl DayActivity {
    /// A day counts toward the streak if anything happened on it.
    pub fn qualifies(&self) -> bool {
        self.completed_tasks > 0 || self.sessions > 0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductivityScore {
    pub task_score: f64,
    pub time_score: f64,
    pub session_score: f64,
    /// Rounded sum of the three components, always within 0..=100.
    pub total: u32,
}

impl ProductivityScore {
    pub fn from_activity(activity: &DayActivity) -> Self {
        let task_score = (f64::from(activity.completed_tasks) * TASK_POINTS).min(TASK_CAP);
        let time_score = (activity.focus_minutes as f64 / MINUTES_PER_POINT).min(TIME_CAP);
        let session_score = (f64::from(activity.sessions) * SESSION_POINTS).min(SESSION_CAP);
        let total = (task_score + time_score + session_score).round() as u32;
        Self {
            task_score,
            time_score,
            session_score,
            total,
        }
    }
}

/// Daily and weekly score targets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Goals {
    pub daily_score: f64,
    pub weekly_average: f64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            daily_score: 100.0,
            weekly_average: 70.0,
        }
    }
}

/// Everything the dashboard shows about productivity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductivityMetrics {
    pub daily_score: u32,
    pub tasks_completed_today: u32,
    /// Focus time in hours, one decimal place.
    pub focus_hours_today: f64,
    pub weekly_average: u32,
    pub streak: u32,
    pub daily_goal_percent: u32,
    pub weekly_goal_percent: u32,
}

/// Percentage of `goal` reached by `score`, capped at 100.
///
/// A goal that is zero, negative or not finite yields 0.
pub fn goal_progress(score: f64, goal: f64) -> u32 {
    if !goal.is_finite() || goal <= 0.0 || !score.is_finite() {
        return 0;
    }
    (score / goal * 100.0).round().clamp(0.0, 100.0) as u32
}

/// Scoring over a snapshot of the task and session collections.
///
/// Activity is bucketed by local calendar day once, at construction.
#[derive(Debug, Clone)]
pub struct ProductivityEngine<Tz: TimeZone> {
    tz: Tz,
    by_day: HashMap<NaiveDate, DayActivity>,
    max_lookback_days: u32,
}

impl<Tz: TimeZone> ProductivityEngine<Tz> {
    pub fn new(tasks: &[Task], sessions: &[TimerSession], tz: Tz) -> Self {
        let mut by_day: HashMap<NaiveDate, DayActivity> = HashMap::new();

        for completed_at in tasks.iter().filter_map(Task::completion) {
            let day = completed_at.with_timezone(&tz).date_naive();
            by_day.entry(day).or_default().completed_tasks += 1;
        }

        for session in sessions {
            let day = session.date.with_timezone(&tz).date_naive();
            let entry = by_day.entry(day).or_default();
            entry.sessions += 1;
            entry.focus_minutes += u64::from(session.duration_min);
        }

        Self {
            tz,
            by_day,
            max_lookback_days: DEFAULT_MAX_LOOKBACK_DAYS,
        }
    }

    pub fn with_max_lookback_days(mut self, days: u32) -> Self {
        self.max_lookback_days = days;
        self
    }

    /// The local calendar day containing `at`.
    pub fn local_day(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.tz).date_naive()
    }

    pub fn activity_on(&self, day: NaiveDate) -> DayActivity {
        self.by_day.get(&day).copied().unwrap_or_default()
    }

    pub fn score_for_day(&self, day: NaiveDate) -> ProductivityScore {
        ProductivityScore::from_activity(&self.activity_on(day))
    }

    /// Mean daily total over the seven days ending at `as_of`, rounded.
    pub fn weekly_average(&self, as_of: NaiveDate) -> u32 {
        let sum: u32 = (0..WEEK_DAYS)
            .filter_map(|i| as_of.checked_sub_days(Days::new(i)))
            .map(|day| self.score_for_day(day).total)
            .sum();
        (f64::from(sum) / WEEK_DAYS as f64).round() as u32
    }

    /// Consecutive active days walking backward from `as_of`.
    ///
    /// An inactive `as_of` is skipped rather than ending the walk, so a
    /// streak is not lost before the current day is over. It is not counted
    /// either. Any later inactive day ends the walk.
    pub fn streak(&self, as_of: NaiveDate) -> u32 {
        let mut streak = 0;
        for i in 0..self.max_lookback_days {
            let Some(day) = as_of.checked_sub_days(Days::new(u64::from(i))) else {
                break;
            };
            if self.activity_on(day).qualifies() {
                streak += 1;
            } else if i > 0 {
                break;
            }
        }
        streak
    }

    pub fn metrics(&self, as_of: NaiveDate, goals: Goals) -> ProductivityMetrics {
        let today = self.activity_on(as_of);
        let daily_score = ProductivityScore::from_activity(&today).total;
        let weekly_average = self.weekly_average(as_of);
        let focus_hours_today = (today.focus_minutes as f64 / 60.0 * 10.0).round() / 10.0;

        ProductivityMetrics {
            daily_score,
            tasks_completed_today: today.completed_tasks,
            focus_hours_today,
            weekly_average,
            streak: self.streak(as_of),
            daily_goal_percent: goal_progress(f64::from(daily_score), goals.daily_score),
            weekly_goal_percent: goal_progress(f64::from(weekly_average), goals.weekly_average),
        }
    }

    /// Metrics for the local day containing `now`.
    pub fn metrics_at(&self, now: DateTime<Utc>, goals: Goals) -> ProductivityMetrics {
        self.metrics(self.local_day(now), goals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset};
    use proptest::prelude::*;

    fn noon(day: NaiveDate) -> DateTime<Utc> {
        day.and_hms_opt(12, 0, 0).unwrap().and_utc()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn done_task(at: DateTime<Utc>) -> Task {
        let mut task = Task::new("done", at);
        task.complete(at);
        task
    }

    fn days_ago(n: u64) -> NaiveDate {
        today().checked_sub_days(Days::new(n)).unwrap()
    }

    #[test]
    fn empty_inputs_score_zero() {
        let engine = ProductivityEngine::new(&[], &[], Utc);
        assert_eq!(engine.score_for_day(today()), ProductivityScore::default());
        assert_eq!(engine.weekly_average(today()), 0);
        assert_eq!(engine.streak(today()), 0);
    }

    #[test]
    fn task_component_caps_at_forty() {
        let tasks: Vec<Task> = (0..5).map(|_| done_task(noon(today()))).collect();
        let engine = ProductivityEngine::new(&tasks, &[], Utc);
        let score = engine.score_for_day(today());
        assert_eq!(score.task_score, 40.0);
        assert_eq!(score.total, 40);
    }

    #[test]
    fn long_session_caps_time_component() {
        let sessions = vec![TimerSession::work(100, noon(today()))];
        let engine = ProductivityEngine::new(&[], &sessions, Utc);
        let score = engine.score_for_day(today());
        assert_eq!(score.time_score, 40.0);
        assert_eq!(score.session_score, 5.0);
        assert_eq!(score.total, 45);
    }

    #[test]
    fn fractional_time_score_rounds_only_the_total() {
        // 25 min -> 12.5 time points, plus 5 session points.
        let sessions = vec![TimerSession::work(25, noon(today()))];
        let engine = ProductivityEngine::new(&[], &sessions, Utc);
        let score = engine.score_for_day(today());
        assert_eq!(score.time_score, 12.5);
        assert_eq!(score.total, 18);
    }

    #[test]
    fn incomplete_or_unstamped_tasks_do_not_count() {
        let mut pending = Task::new("pending", noon(today()));
        pending.completed_at = Some(noon(today()));
        let mut unstamped = Task::new("unstamped", noon(today()));
        unstamped.completed = true;

        let engine = ProductivityEngine::new(&[pending, unstamped], &[], Utc);
        assert_eq!(engine.activity_on(today()).completed_tasks, 0);
    }

    #[test]
    fn calendar_day_follows_time_zone() {
        // 23:30 UTC on the 14th is already the 15th at UTC+2.
        let at = noon(days_ago(1)) + Duration::minutes(11 * 60 + 30);
        let sessions = vec![TimerSession::work(30, at)];

        let utc = ProductivityEngine::new(&[], &sessions, Utc);
        assert_eq!(utc.activity_on(days_ago(1)).sessions, 1);

        let plus_two = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = ProductivityEngine::new(&[], &sessions, plus_two);
        assert_eq!(local.activity_on(today()).sessions, 1);
        assert_eq!(local.activity_on(days_ago(1)).sessions, 0);
    }

    #[test]
    fn weekly_average_of_identical_days() {
        // 2 sessions x 60 min => 40 + 10 = 50 per day.
        let sessions: Vec<TimerSession> = (0..7)
            .flat_map(|i| {
                let at = noon(days_ago(i));
                [TimerSession::work(60, at), TimerSession::work(60, at)]
            })
            .collect();
        let engine = ProductivityEngine::new(&[], &sessions, Utc);
        assert_eq!(engine.score_for_day(days_ago(3)).total, 50);
        assert_eq!(engine.weekly_average(today()), 50);
    }

    #[test]
    fn weekly_average_ignores_days_outside_window() {
        let sessions = vec![TimerSession::work(100, noon(days_ago(7)))];
        let engine = ProductivityEngine::new(&[], &sessions, Utc);
        assert_eq!(engine.weekly_average(today()), 0);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let sessions = vec![
            TimerSession::work(25, noon(today())),
            TimerSession::work(25, noon(days_ago(1))),
            TimerSession::work(25, noon(days_ago(3))),
        ];
        let engine = ProductivityEngine::new(&[], &sessions, Utc);
        assert_eq!(engine.streak(today()), 2);
    }

    #[test]
    fn inactive_today_does_not_break_streak() {
        // Today is skipped, not counted; yesterday and the day before are.
        let tasks = vec![done_task(noon(days_ago(1)))];
        let sessions = vec![TimerSession::work(25, noon(days_ago(2)))];
        let engine = ProductivityEngine::new(&tasks, &sessions, Utc);
        assert_eq!(engine.streak(today()), 2);
    }

    #[test]
    fn inactive_today_and_yesterday_is_zero() {
        let sessions = vec![TimerSession::work(25, noon(days_ago(2)))];
        let engine = ProductivityEngine::new(&[], &sessions, Utc);
        assert_eq!(engine.streak(today()), 0);
    }

    #[test]
    fn streak_is_bounded_by_lookback() {
        let sessions: Vec<TimerSession> = (0..20)
            .map(|i| TimerSession::work(5, noon(days_ago(i))))
            .collect();
        let engine = ProductivityEngine::new(&[], &sessions, Utc).with_max_lookback_days(10);
        assert_eq!(engine.streak(today()), 10);
    }

    #[test]
    fn goal_progress_caps_and_guards_zero() {
        assert_eq!(goal_progress(45.0, 100.0), 45);
        assert_eq!(goal_progress(35.0, 70.0), 50);
        assert_eq!(goal_progress(90.0, 70.0), 100);
        assert_eq!(goal_progress(10.0, 0.0), 0);
        assert_eq!(goal_progress(10.0, -5.0), 0);
        assert_eq!(goal_progress(10.0, f64::NAN), 0);
    }

    #[test]
    fn metrics_combine_today_and_week() {
        let tasks = vec![done_task(noon(today())), done_task(noon(today()))];
        let sessions = vec![TimerSession::work(90, noon(today()))];
        let engine = ProductivityEngine::new(&tasks, &sessions, Utc);

        let metrics = engine.metrics(today(), Goals::default());
        // 20 task + 40 time + 5 session
        assert_eq!(metrics.daily_score, 65);
        assert_eq!(metrics.tasks_completed_today, 2);
        assert_eq!(metrics.focus_hours_today, 1.5);
        assert_eq!(metrics.weekly_average, 9);
        assert_eq!(metrics.streak, 1);
        assert_eq!(metrics.daily_goal_percent, 65);
        assert_eq!(metrics.weekly_goal_percent, 13);
    }

    proptest! {
        #[test]
        fn total_is_bounded(
            tasks in 0u32..10_000,
            sessions in 0u32..10_000,
            minutes in 0u64..1_000_000,
        ) {
            let score = ProductivityScore::from_activity(&DayActivity {
                completed_tasks: tasks,
                sessions,
                focus_minutes: minutes,
            });
            prop_assert!(score.total <= 100);
            prop_assert!(score.task_score <= TASK_CAP);
            prop_assert!(score.time_score <= TIME_CAP);
            prop_assert!(score.session_score <= SESSION_CAP);
        }
    }
}
