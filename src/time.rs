//! Frame pacing for the native window host.
//!
//! Animations advance by whole ticks, not by elapsed seconds, so on a
//! 144 Hz display they would run more than twice as fast as intended. The
//! window host asks a [`FrameClock`] whether a tick is due before stepping
//! the engine, which pins the tick rate to a target (60 Hz by default)
//! regardless of how often redraws are delivered.
//!
//! # Example
//!
//! ```ignore
//! let mut clock = FrameClock::new();
//!
//! // On every redraw:
//! if clock.is_due() {
//!     clock.tick();
//!     engine.on_frame(handle);
//! }
//! log::debug!("{:.1} fps", clock.fps());
//! ```

use std::time::{Duration, Instant};

/// Ticks per second the animations are tuned for.
pub const DEFAULT_TICK_RATE: f32 = 60.0;

/// Window over which the tick rate is measured.
const FPS_WINDOW: Duration = Duration::from_millis(500);

/// Tick pacing and tick-rate measurement.
#[derive(Debug)]
pub struct FrameClock {
    last_tick: Instant,
    /// Minimum time between ticks.
    interval: Duration,
    ticks: u64,
    fps: f32,
    /// Start of the current measurement window and the tick count at it.
    window_start: Instant,
    window_ticks: u64,
}

impl FrameClock {
    /// A clock pacing at [`DEFAULT_TICK_RATE`].
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_TICK_RATE)
    }

    /// A clock pacing at `rate` ticks per second. Non-positive rates never pace.
    pub fn with_rate(rate: f32) -> Self {
        let now = Instant::now();
        let interval = if rate > 0.0 {
            Duration::from_secs_f32(1.0 / rate)
        } else {
            Duration::ZERO
        };
        Self {
            // Due immediately.
            last_tick: now.checked_sub(interval).unwrap_or(now),
            interval,
            ticks: 0,
            fps: 0.0,
            window_start: now,
            window_ticks: 0,
        }
    }

    /// Whether enough time has passed for the next tick.
    pub fn is_due(&self) -> bool {
        self.last_tick.elapsed() >= self.interval
    }

    /// Time left until the next tick is due.
    pub fn until_due(&self) -> Duration {
        self.interval.saturating_sub(self.last_tick.elapsed())
    }

    /// Record a tick. Call once per engine step.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.last_tick = now;
        self.ticks += 1;

        let span = now.duration_since(self.window_start);
        if span >= FPS_WINDOW {
            self.fps = (self.ticks - self.window_ticks) as f32 / span.as_secs_f32();
            self.window_ticks = self.ticks;
            self.window_start = now;
        }
    }

    /// Total ticks recorded.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Measured ticks per second, zero until the first window closes.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
