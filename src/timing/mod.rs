//! Time capture for attempts: a monotonic clock source and the stopwatch state machine.

/// Time sources.
pub mod clock;
/// Attempt stopwatch.
pub mod stopwatch;

pub use clock::{Clock, SystemClock};
pub use stopwatch::{
    DEFAULT_TICK, Stopwatch, StopwatchError, StopwatchOp, StopwatchState, TimingMode,
};
