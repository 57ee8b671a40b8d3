//! # Nosofy Core Library
//!
//! The dashboard core of the Nosofy productivity app: a countdown timer
//! that records completed work sessions, and a scoring engine that turns
//! completed tasks and sessions into a daily score, a weekly average and an
//! activity streak. The `nosofy` CLI is a thin shell over this library.
//!
//! ## Architecture
//!
//! - **Countdown Timer**: a tick-driven state machine; the caller (or a
//!   [`Ticker`]) supplies one `tick_at()` per second
//! - **Scoring**: pure functions over task and session snapshots
//! - **Storage**: SQLite record collections and TOML configuration
//!
//! ## Key Components
//!
//! - [`CountdownTimer`]: Idle / Running / Paused countdown
//! - [`Dashboard`]: timer + store coordinator
//! - [`ProductivityEngine`]: score, weekly average, streak
//! - [`Database`]: `tasks`, `timersessions` and kv persistence
//! - [`Config`]: Application configuration management

pub mod dashboard;
pub mod error;
pub mod events;
pub mod focus_goals;
pub mod records;
pub mod stats;
pub mod storage;
pub mod timer;

pub use dashboard::{CompletedSession, Dashboard};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use focus_goals::{FocusGoal, FocusGoals};
pub use records::{Priority, SessionKind, Task, TimerSession};
pub use stats::{
    goal_progress, Goals, ProductivityEngine, ProductivityMetrics, ProductivityScore,
    TimerStats, WeeklySummary,
};
pub use storage::{Config, Database, Store};
pub use timer::{CountdownTimer, Ticker, TimerCategory, TimerPreset, TimerState};
