//! Statistics module for Nosofy
//!
//! Productivity scoring over completed tasks and timer sessions, plus the
//! timer counters and weekly summary shown on the dashboard.

mod productivity;
mod summary;

pub use productivity::{
    goal_progress, DayActivity, Goals, ProductivityEngine, ProductivityMetrics,
    ProductivityScore, DEFAULT_MAX_LOOKBACK_DAYS, WEEK_DAYS,
};
pub use summary::{timer_stats, weekly_summary, TimerStats, WeeklySummary};
