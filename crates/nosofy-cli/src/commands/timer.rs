use std::future::Future;

use chrono::{DateTime, Local, TimeZone, Utc};
use clap::{Subcommand, ValueEnum};
use nosofy_core::{
    CountdownTimer, Dashboard, Database, Store, Task, Ticker, TimerPreset, TimerSession,
    TimerState,
};
use tokio::sync::mpsc;

use super::{open_dashboard, print_json, CmdResult};

const TIMER_KEY: &str = "countdown_timer";

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    Work,
    ShortBreak,
    LongBreak,
}

impl From<PresetArg> for TimerPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Work => TimerPreset::Work,
            PresetArg::ShortBreak => TimerPreset::ShortBreak,
            PresetArg::LongBreak => TimerPreset::LongBreak,
        }
    }
}

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start or resume the countdown
    Start,
    /// Pause the countdown
    Pause,
    /// Catch up on elapsed time and print the current state as JSON
    Status,
    /// Stop the countdown and reload its duration
    Reset {
        /// Minutes to load (default: configured duration)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Switch to a work / short-break / long-break countdown
    Preset {
        #[arg(value_enum)]
        preset: PresetArg,
    },
    /// Run the countdown in the foreground until it expires or Ctrl-C
    Run {
        /// Reset to this many minutes before starting
        #[arg(long)]
        minutes: Option<u32>,
        /// Run a break countdown instead of a work one
        #[arg(long = "break")]
        is_break: bool,
    },
}

fn load_timer(db: &Database) -> Option<CountdownTimer> {
    let json = db.kv_get(TIMER_KEY).ok()??;
    serde_json::from_str(&json).ok()
}

fn save_timer(db: &Database, timer: &CountdownTimer) -> CmdResult {
    db.kv_set(TIMER_KEY, &serde_json::to_string(timer)?)?;
    Ok(())
}

pub fn run(action: TimerAction) -> CmdResult {
    let mut dash = open_dashboard()?;
    if let Some(timer) = load_timer(dash.store()) {
        dash = dash.with_timer(timer);
    }

    // A timer persisted while running keeps counting between invocations.
    let now = Utc::now();
    if let Some(done) = dash.advance_to(now)? {
        print_json(&done)?;
    }

    match action {
        TimerAction::Start => match dash.start_at(now) {
            Some(event) => print_json(&event)?,
            None => print_json(&dash.timer().snapshot_at(now))?,
        },
        TimerAction::Pause => match dash.pause_at(now) {
            Some(event) => print_json(&event)?,
            None => print_json(&dash.timer().snapshot_at(now))?,
        },
        TimerAction::Status => print_json(&dash.timer().snapshot_at(now))?,
        TimerAction::Reset { minutes } => print_json(&dash.reset_at(minutes, now))?,
        TimerAction::Preset { preset } => print_json(&dash.apply_preset_at(preset.into(), now))?,
        TimerAction::Run { minutes, is_break } => {
            if is_break {
                dash.apply_preset_at(TimerPreset::ShortBreak, now);
            }
            if minutes.is_some() {
                dash.reset_at(minutes, now);
            }
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_foreground(&mut dash))?;
        }
    }

    save_timer(dash.store(), dash.timer())?;
    Ok(())
}

/// Drive the countdown from a one-second ticker until it leaves `Running`.
async fn run_foreground(dash: &mut Dashboard<Database, Local>) -> CmdResult {
    let (tx, mut rx) = mpsc::channel(4);
    let mut ticker = Ticker::default();
    ticker.start(tx);

    let result = drive(dash, &mut rx, tokio::signal::ctrl_c()).await;
    ticker.stop();
    result
}

/// Apply each received tick until the countdown stops, the tick channel
/// closes or `shutdown` resolves. Shutdown pauses a running countdown.
async fn drive<S, Tz, F>(
    dash: &mut Dashboard<S, Tz>,
    ticks: &mut mpsc::Receiver<DateTime<Utc>>,
    shutdown: F,
) -> CmdResult
where
    S: Store<Task> + Store<TimerSession>,
    Tz: TimeZone,
    F: Future<Output = std::io::Result<()>>,
{
    if let Some(event) = dash.start_at(Utc::now()) {
        print_json(&event)?;
    }

    // Created once so a signal that lands mid-tick is not lost.
    tokio::pin!(shutdown);
    while dash.timer().state() == TimerState::Running {
        tokio::select! {
            tick = ticks.recv() => {
                let Some(at) = tick else { break };
                if let Some(done) = dash.tick_at(at)? {
                    print_json(&done)?;
                }
                eprint!("\r{} ", dash.timer().display());
            }
            _ = &mut shutdown => {
                eprintln!();
                if let Some(event) = dash.pause_at(Utc::now()) {
                    print_json(&event)?;
                }
                break;
            }
        }
    }
    eprintln!();

    print_json(&dash.timer().snapshot())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use nosofy_core::{Config, TimerCategory};

    fn dashboard(minutes: u32) -> Dashboard<Database, Utc> {
        Dashboard::new(Database::open_memory().unwrap(), Config::default(), Utc)
            .with_timer(CountdownTimer::new(TimerCategory::Work, minutes))
    }

    #[tokio::test]
    async fn drive_records_session_at_expiry() {
        let mut dash = dashboard(1);
        let (tx, mut rx) = mpsc::channel(64);
        let start = Utc::now();
        for i in 1..=60 {
            tx.send(start + Duration::seconds(i)).await.unwrap();
        }

        drive(&mut dash, &mut rx, std::future::pending())
            .await
            .unwrap();

        assert_eq!(dash.timer().state(), TimerState::Idle);
        let stored: Vec<TimerSession> = dash.store().get_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].duration_min, 1);
    }

    #[tokio::test]
    async fn drive_pauses_on_shutdown() {
        let mut dash = dashboard(25);
        let (_tx, mut rx) = mpsc::channel(4);

        drive(&mut dash, &mut rx, std::future::ready(Ok(())))
            .await
            .unwrap();

        assert_eq!(dash.timer().state(), TimerState::Paused);
        assert_eq!(dash.timer().remaining_secs(), 25 * 60);
        let stored: Vec<TimerSession> = dash.store().get_all().unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn drive_stops_when_ticks_end() {
        let mut dash = dashboard(25);
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(Utc::now()).await.unwrap();
        drop(tx);

        drive(&mut dash, &mut rx, std::future::pending())
            .await
            .unwrap();

        assert_eq!(dash.timer().remaining_secs(), 25 * 60 - 1);
    }
}
