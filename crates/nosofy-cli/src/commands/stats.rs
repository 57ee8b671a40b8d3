use chrono::Utc;
use clap::Subcommand;

use super::{open_dashboard, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's timer sessions and minutes
    Today,
    /// Rolling seven-day summary
    Week,
    /// Productivity score, weekly average, streak and goal progress
    Metrics,
    /// Open tasks with a deadline, soonest first
    Deadlines,
}

pub fn run(action: StatsAction) -> CmdResult {
    let dash = open_dashboard()?;
    let now = Utc::now();

    match action {
        StatsAction::Today => print_json(&dash.timer_stats_at(now)?)?,
        StatsAction::Week => print_json(&dash.weekly_summary_at(now)?)?,
        StatsAction::Metrics => print_json(&dash.metrics_at(now)?)?,
        StatsAction::Deadlines => print_json(&dash.upcoming_deadlines()?)?,
    }
    Ok(())
}
