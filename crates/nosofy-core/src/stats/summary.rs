//! Timer counters and the rolling weekly summary.

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::records::{Task, TimerSession};

/// Session counters shown next to the countdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStats {
    pub sessions_today: u32,
    pub minutes_today: u64,
    pub total_sessions: u32,
}

pub fn timer_stats<Tz: TimeZone>(
    sessions: &[TimerSession],
    now: DateTime<Utc>,
    tz: &Tz,
) -> TimerStats {
    let today = now.with_timezone(tz).date_naive();
    let mut stats = TimerStats {
        total_sessions: sessions.len() as u32,
        ..TimerStats::default()
    };
    for session in sessions
        .iter()
        .filter(|s| s.date.with_timezone(tz).date_naive() == today)
    {
        stats.sessions_today += 1;
        stats.minutes_today += u64::from(session.duration_min);
    }
    stats
}

/// Activity over the last seven days (a rolling 7 x 24h window, not
/// calendar days).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub tasks_completed: u32,
    pub sessions: u32,
    /// Distinct local calendar days with a session or a task completion.
    pub active_days: u32,
}

pub fn weekly_summary<Tz: TimeZone>(
    tasks: &[Task],
    sessions: &[TimerSession],
    now: DateTime<Utc>,
    tz: &Tz,
) -> WeeklySummary {
    let since = now - Duration::days(7);
    let mut active = HashSet::new();
    let mut summary = WeeklySummary::default();

    for session in sessions.iter().filter(|s| s.date >= since) {
        summary.sessions += 1;
        active.insert(session.date.with_timezone(tz).date_naive());
    }
    for completed_at in tasks
        .iter()
        .filter_map(Task::completion)
        .filter(|at| *at >= since)
    {
        summary.tasks_completed += 1;
        active.insert(completed_at.with_timezone(tz).date_naive());
    }

    summary.active_days = active.len() as u32;
    summary
}
