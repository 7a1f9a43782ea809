use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use thiserror::Error;
use tokio::{
    runtime::Handle,
    sync::watch,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::timing::clock::{Clock, SystemClock};

/// Refresh period of the presentational elapsed value.
pub const DEFAULT_TICK: Duration = Duration::from_millis(10);

/// Whether the time comes from the stopwatch or is typed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimingMode {
    /// Measured between `start` and `stop`.
    #[default]
    Automatic,
    /// Entered with `set_manual`; `start` is rejected.
    Manual,
}

/// Lifecycle of a single measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopwatchState {
    /// Nothing measured; elapsed is zero.
    #[default]
    Idle,
    /// Measuring from a captured start instant.
    Running,
    /// Measurement finished; elapsed is frozen.
    Stopped,
}

/// Operations that can be rejected by the stopwatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopwatchOp {
    /// [`Stopwatch::start`].
    Start,
    /// [`Stopwatch::stop`].
    Stop,
    /// [`Stopwatch::reset`].
    Reset,
    /// [`Stopwatch::set_manual`].
    SetManual,
    /// [`Stopwatch::set_mode`].
    SetMode,
}

/// Error returned when an operation does not apply to the current stopwatch state.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StopwatchError {
    /// The operation does not apply in the current state.
    #[error("invalid stopwatch operation: {op:?} cannot be applied while {state:?}")]
    InvalidTransition {
        /// State the stopwatch was in.
        state: StopwatchState,
        /// Rejected operation.
        op: StopwatchOp,
    },
    /// The operation does not apply in the current mode.
    #[error("invalid stopwatch operation: {op:?} is not available in {mode:?} mode")]
    WrongMode {
        /// Current timing mode.
        mode: TimingMode,
        /// Rejected operation.
        op: StopwatchOp,
    },
    /// Manual value was negative, NaN or infinite.
    #[error("manual time must be a finite, non-negative number of seconds, got {value}")]
    InvalidManualTime {
        /// Rejected value.
        value: f64,
    },
}

/// Background task publishing the running elapsed value.
///
/// Dropping the ticker cancels it; once `active` is cleared no further value
/// is published, even by a tick that was already in flight.
struct Ticker {
    active: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Ticker {
    fn spawn<C: Clock>(
        runtime: &Handle,
        clock: C,
        started_at: Instant,
        period: Duration,
        sender: Arc<watch::Sender<f64>>,
    ) -> Self {
        let active = Arc::new(AtomicBool::new(true));
        let flag = active.clone();
        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                let elapsed = seconds_since(started_at, clock.now());
                sender.send_if_modified(|value| {
                    if flag.load(Ordering::Acquire) {
                        *value = elapsed;
                        true
                    } else {
                        false
                    }
                });
            }
        });
        Self { active, handle }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.active.store(false, Ordering::Release);
        self.handle.abort();
    }
}

fn seconds_since(start: Instant, now: Instant) -> f64 {
    now.saturating_duration_since(start).as_secs_f64()
}

/// Stopwatch capturing the elapsed seconds of an attempt.
///
/// The value of record is computed once on [`Stopwatch::stop`] from the start
/// instant. The watch channel returned by [`Stopwatch::subscribe`] only
/// carries a periodically refreshed copy for display.
pub struct Stopwatch<C: Clock = SystemClock> {
    clock: C,
    tick: Duration,
    mode: TimingMode,
    state: StopwatchState,
    started_at: Option<Instant>,
    elapsed: f64,
    sender: Arc<watch::Sender<f64>>,
    ticker: Option<Ticker>,
}

impl Stopwatch<SystemClock> {
    /// Idle automatic stopwatch reading the monotonic system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for Stopwatch<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Stopwatch<C> {
    /// Idle automatic stopwatch reading `clock`, refreshing every [`DEFAULT_TICK`].
    pub fn with_clock(clock: C) -> Self {
        let (sender, _) = watch::channel(0.0);
        Self {
            clock,
            tick: DEFAULT_TICK,
            mode: TimingMode::default(),
            state: StopwatchState::default(),
            started_at: None,
            elapsed: 0.0,
            sender: Arc::new(sender),
            ticker: None,
        }
    }

    /// Override the refresh period of the published value.
    pub fn tick_interval(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StopwatchState {
        self.state
    }

    /// Current entry mode.
    pub fn mode(&self) -> TimingMode {
        self.mode
    }

    /// Current elapsed seconds; sampled from the clock while running.
    pub fn elapsed(&self) -> f64 {
        match (self.state, self.started_at) {
            (StopwatchState::Running, Some(start)) => seconds_since(start, self.clock.now()),
            _ => self.elapsed,
        }
    }

    /// The time to submit, if there is one.
    pub fn reading(&self) -> Option<f64> {
        (self.state != StopwatchState::Running && self.elapsed > 0.0).then_some(self.elapsed)
    }

    /// Receiver of the presentational elapsed value.
    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.sender.subscribe()
    }

    /// Begin measuring. A restart from `Stopped` discards the previous value.
    pub fn start(&mut self) -> Result<(), StopwatchError> {
        if self.mode == TimingMode::Manual {
            return Err(StopwatchError::WrongMode {
                mode: self.mode,
                op: StopwatchOp::Start,
            });
        }
        self.ensure_not_running(StopwatchOp::Start)?;

        let started_at = self.clock.now();
        self.started_at = Some(started_at);
        self.elapsed = 0.0;
        self.state = StopwatchState::Running;
        self.sender.send_replace(0.0);

        self.ticker = match Handle::try_current() {
            Ok(runtime) => Some(Ticker::spawn(
                &runtime,
                self.clock.clone(),
                started_at,
                self.tick,
                self.sender.clone(),
            )),
            Err(_) => {
                debug!("no tokio runtime; stopwatch running without refresh ticker");
                None
            }
        };
        Ok(())
    }

    /// Finish measuring and return the value of record.
    pub fn stop(&mut self) -> Result<f64, StopwatchError> {
        let Some(started_at) = self
            .started_at
            .filter(|_| self.state == StopwatchState::Running)
        else {
            return Err(self.invalid(StopwatchOp::Stop));
        };

        let elapsed = seconds_since(started_at, self.clock.now());
        self.cancel_ticker();
        self.elapsed = elapsed;
        self.state = StopwatchState::Stopped;
        self.sender.send_replace(elapsed);
        Ok(elapsed)
    }

    /// Return to `Idle` with a zero value.
    pub fn reset(&mut self) -> Result<(), StopwatchError> {
        self.ensure_not_running(StopwatchOp::Reset)?;
        self.cancel_ticker();
        self.clear();
        Ok(())
    }

    /// Enter a typed-in time, switching to manual mode.
    pub fn set_manual(&mut self, value: f64) -> Result<(), StopwatchError> {
        self.ensure_not_running(StopwatchOp::SetManual)?;
        if !value.is_finite() || value < 0.0 {
            return Err(StopwatchError::InvalidManualTime { value });
        }

        self.cancel_ticker();
        self.mode = TimingMode::Manual;
        self.started_at = None;
        self.elapsed = value;
        self.state = if value > 0.0 {
            StopwatchState::Stopped
        } else {
            StopwatchState::Idle
        };
        self.sender.send_replace(value);
        Ok(())
    }

    /// Switch between automatic and manual entry; the current value is discarded.
    pub fn set_mode(&mut self, mode: TimingMode) -> Result<(), StopwatchError> {
        self.ensure_not_running(StopwatchOp::SetMode)?;
        self.cancel_ticker();
        self.mode = mode;
        self.clear();
        Ok(())
    }

    fn clear(&mut self) {
        self.started_at = None;
        self.elapsed = 0.0;
        self.state = StopwatchState::Idle;
        self.sender.send_replace(0.0);
    }

    fn cancel_ticker(&mut self) {
        self.ticker.take();
    }

    fn ensure_not_running(&self, op: StopwatchOp) -> Result<(), StopwatchError> {
        if self.state == StopwatchState::Running {
            Err(self.invalid(op))
        } else {
            Ok(())
        }
    }

    fn invalid(&self, op: StopwatchOp) -> StopwatchError {
        StopwatchError::InvalidTransition {
            state: self.state,
            op,
        }
    }
}
