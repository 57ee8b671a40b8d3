mod countdown;
mod ticker;

pub use countdown::{CountdownTimer, TimerCategory, TimerPreset, TimerState};
pub use ticker::Ticker;
