//! Looping decorative animations
//!
//! Loops hold no timers and no mutable state: the value is a pure function
//! of the clock. Any number of consumers can read the same loop, or share a
//! clock across loops, without coordinating.

use assay_core::error::{ensure_finite, ConfigError};

use crate::easing::Easing;
use crate::keyframe::KeyframeTrack;

/// Position within a cycle: `now` modulo `period`, in `[0, period)`
///
/// A non-positive or non-finite period (or a non-finite `now`) yields 0.
pub fn phase(now: f64, period: f64) -> f64 {
    if !period.is_finite() || period <= 0.0 || !now.is_finite() {
        return 0.0;
    }
    let p = now.rem_euclid(period);
    // rem_euclid can round up to exactly `period` for tiny negative inputs
    if p >= period {
        0.0
    } else {
        p
    }
}

/// How a cycle repeats
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Jump back to the start after each cycle
    #[default]
    Restart,
    /// Play forward, then backward (one full trip takes two periods)
    Reverse,
}

/// What a loop produces from its cycle progress
#[derive(Clone, Debug, PartialEq)]
pub enum LoopTrack {
    /// A continuous turn, `degrees` per cycle
    Rotation { degrees: f32 },
    /// A keyframed value such as an opacity pulse
    Keyframes(KeyframeTrack),
}

/// A looping animation sampled from the clock
#[derive(Clone, Debug, PartialEq)]
pub struct LoopingAnimator {
    period: f64,
    /// Seconds added to `now` before sampling (desynchronizes copies)
    offset: f64,
    mode: LoopMode,
    track: LoopTrack,
}

impl LoopingAnimator {
    /// A loop of `period` seconds; invalid periods freeze the loop at its
    /// first frame
    pub fn new(period: f64, track: LoopTrack) -> Self {
        let period = match Self::validate(period) {
            Ok(period) => period,
            Err(err) => {
                tracing::warn!(%err, "loop will not advance");
                0.0
            }
        };
        Self {
            period,
            offset: 0.0,
            mode: LoopMode::Restart,
            track,
        }
    }

    pub fn validate(period: f64) -> Result<f64, ConfigError> {
        let period = ensure_finite("period", period)?;
        if period <= 0.0 {
            return Err(ConfigError::NonPositivePeriod(period));
        }
        Ok(period)
    }

    /// Steady rotation, one full turn per period
    pub fn spin(period: f64) -> Self {
        Self::new(period, LoopTrack::Rotation { degrees: 360.0 })
    }

    /// Opacity pulsing `0.5 -> 1.0 -> 0.5` each period
    pub fn pulse_opacity(period: f64) -> Self {
        Self::new(
            period,
            LoopTrack::Keyframes(KeyframeTrack::evenly(&[0.5, 1.0, 0.5], Easing::EaseInOut)),
        )
    }

    pub fn offset(mut self, seconds: f64) -> Self {
        self.offset = if seconds.is_finite() { seconds } else { 0.0 };
        self
    }

    pub fn mode(mut self, mode: LoopMode) -> Self {
        self.mode = mode;
        self
    }

    /// Phase in seconds at `now`, in `[0, period)`
    pub fn phase(&self, now: f64) -> f64 {
        phase(now + self.offset, self.period)
    }

    /// Normalized progress through the current cycle, honoring the mode
    pub fn progress(&self, now: f64) -> f32 {
        if self.period <= 0.0 {
            return 0.0;
        }
        match self.mode {
            LoopMode::Restart => (self.phase(now) / self.period) as f32,
            LoopMode::Reverse => {
                let trip = phase(now + self.offset, self.period * 2.0) / self.period;
                if trip <= 1.0 {
                    trip as f32
                } else {
                    (2.0 - trip) as f32
                }
            }
        }
    }

    /// Track value at `now`
    pub fn value(&self, now: f64) -> f32 {
        let progress = self.progress(now);
        match &self.track {
            LoopTrack::Rotation { degrees } => degrees * progress,
            LoopTrack::Keyframes(track) => track.sample(progress),
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn track(&self) -> &LoopTrack {
        &self.track
    }
}
