//! Frame clocks
//!
//! The frame source is a platform service. Animators only ever see a
//! [`FrameTick`], so the same code runs against the wall clock in a browser
//! host and against a [`ManualClock`] in tests and headless simulation.

use std::cell::Cell;
use std::time::Instant;

/// Nominal display refresh rate used when no rate is configured
pub const DEFAULT_TICK_HZ: f64 = 60.0;

/// A monotonic time source, in seconds since an arbitrary origin
pub trait FrameClock {
    fn now(&self) -> f64;
}

impl<C: FrameClock + ?Sized> FrameClock for &C {
    fn now(&self) -> f64 {
        (**self).now()
    }
}

/// Wall clock backed by [`Instant`]
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to
///
/// Interior mutability lets a ticker hold `&ManualClock` while the driving
/// loop keeps advancing it.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at a specific timestamp
    pub fn starting_at(now: f64) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    /// Move the clock forward. Negative or non-finite steps are ignored.
    pub fn advance(&self, dt: f64) {
        if dt.is_finite() && dt > 0.0 {
            self.now.set(self.now.get() + dt);
        }
    }

    /// Jump to an absolute timestamp
    pub fn set(&self, now: f64) {
        if now.is_finite() {
            self.now.set(now);
        }
    }
}

impl FrameClock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

/// One invocation of the frame loop
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTick {
    /// Timestamp of this frame, in clock seconds
    pub now: f64,
    /// Seconds since the previous frame (0 on the first frame)
    pub dt: f32,
    /// Frame counter, starting at 0
    pub frame: u64,
}

impl FrameTick {
    /// A tick at `now` with no knowledge of a previous frame
    pub fn at(now: f64) -> Self {
        Self {
            now,
            dt: 0.0,
            frame: 0,
        }
    }
}

/// Turns a [`FrameClock`] into a stream of [`FrameTick`]s
pub struct FrameTicker<C: FrameClock> {
    clock: C,
    last: Option<f64>,
    frame: u64,
}

impl<C: FrameClock> FrameTicker<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            last: None,
            frame: 0,
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Sample the clock and produce the next tick
    ///
    /// A clock that steps backwards yields `dt = 0` for that frame.
    pub fn tick(&mut self) -> FrameTick {
        let now = self.clock.now();
        let dt = match self.last {
            Some(last) if now > last => (now - last) as f32,
            _ => 0.0,
        };
        self.last = Some(self.last.map_or(now, |last| last.max(now)));

        let tick = FrameTick {
            now,
            dt,
            frame: self.frame,
        };
        self.frame += 1;
        tick
    }

    /// Number of ticks produced so far
    pub fn frame_count(&self) -> u64 {
        self.frame
    }
}

/// A fixed nominal tick rate
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedRate {
    hz: f64,
}

impl FixedRate {
    pub fn new(hz: f64) -> Self {
        Self { hz }
    }

    pub fn hz(&self) -> f64 {
        self.hz
    }

    /// Seconds between ticks, or `None` when the rate is zero, negative or
    /// not finite. Callers treat `None` as a single instantaneous step.
    pub fn step(&self) -> Option<f64> {
        if self.hz.is_finite() && self.hz > 0.0 {
            Some(1.0 / self.hz)
        } else {
            None
        }
    }

    /// Number of ticks in `[0, seconds]`, including both ends
    ///
    /// Saturates at `u64::MAX` for absurd rates or lengths.
    pub fn frame_count(&self, seconds: f64) -> u64 {
        let seconds = run_length(seconds);
        if self.step().is_none() {
            return 2;
        }
        let last = (seconds * self.hz).floor();
        if last >= u64::MAX as f64 {
            u64::MAX
        } else {
            last as u64 + 1
        }
    }

    /// Timestamps of every tick in `[0, seconds]`, including both ends
    ///
    /// Lazily produced, so the length is bounded only by the caller.
    pub fn timestamps(&self, seconds: f64) -> impl Iterator<Item = f64> {
        let count = self.frame_count(seconds);
        let seconds = run_length(seconds);
        let hz = self.hz;
        let instant = self.step().is_none();
        (0..count).map(move |i| {
            if instant {
                i as f64 * seconds
            } else {
                // Index-based so that tick 120 at 60 Hz lands on exactly 2.0
                i as f64 / hz
            }
        })
    }
}

fn run_length(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

impl Default for FixedRate {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_HZ)
    }
}
