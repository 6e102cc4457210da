//! Visibility-triggered counters
//!
//! A counter shows 0 until its element first scrolls into view, then counts
//! up to its target over a fixed duration. The count is derived from real
//! elapsed time since the start, so frame-rate jitter changes how many
//! distinct values are shown, never when the count lands on the target.

use assay_core::clock::FrameTick;
use assay_core::error::{ensure_finite, ConfigError};
use assay_core::visibility::VisibilityLatch;

/// Counter that animates from 0 to `target` once visible
#[derive(Clone, Debug)]
pub struct CounterAnimator {
    target: u64,
    /// Sanitized duration in seconds; 0 means "complete on start"
    duration: f64,
    latch: VisibilityLatch,
    current: u64,
    finished: bool,
}

impl CounterAnimator {
    /// Create a counter
    ///
    /// A non-positive or non-finite duration is logged and treated as an
    /// instantaneous count. A zero target is finished from the start.
    pub fn new(target: u64, duration_secs: f64) -> Self {
        let duration = match Self::validate(duration_secs) {
            Ok(duration) => duration,
            Err(err) => {
                tracing::warn!(%err, target_value = target, "counter will complete immediately");
                0.0
            }
        };

        Self {
            target,
            duration,
            latch: VisibilityLatch::new(),
            current: 0,
            finished: target == 0,
        }
    }

    /// Check a duration without building a counter
    pub fn validate(duration_secs: f64) -> Result<f64, ConfigError> {
        let duration = ensure_finite("duration", duration_secs)?;
        if duration <= 0.0 {
            return Err(ConfigError::NonPositiveDuration(duration));
        }
        Ok(duration)
    }

    /// Advance the counter for a frame
    pub fn observe(&mut self, visible: bool, tick: &FrameTick) -> u64 {
        self.tick(visible, tick.now)
    }

    /// Advance the counter to `now`, given the element's current visibility
    pub fn tick(&mut self, visible: bool, now: f64) -> u64 {
        if self.finished {
            return self.current;
        }

        let was_running = self.latch.is_latched();
        let Some(started_at) = self.latch.observe(visible, now) else {
            return self.current;
        };

        if !was_running {
            tracing::debug!(target_value = self.target, at = now, "counter started");
            if self.duration == 0.0 {
                self.finish();
            }
            return self.current;
        }

        let elapsed = (now - started_at).max(0.0);
        if elapsed >= self.duration {
            self.finish();
        } else {
            let acc = self.target as f64 * elapsed / self.duration;
            // Only the finishing frame may show the exact target
            let value = (acc.floor() as u64).min(self.target.saturating_sub(1));
            self.current = self.current.max(value);
        }

        self.current
    }

    fn finish(&mut self) {
        self.current = self.target;
        self.finished = true;
        tracing::debug!(target_value = self.target, "counter finished");
    }

    /// Value to display
    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    /// Sanitized duration in seconds
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn started_at(&self) -> Option<f64> {
        self.latch.latched_at()
    }

    pub fn is_running(&self) -> bool {
        self.latch.is_latched() && !self.finished
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fraction of the target currently shown
    pub fn progress(&self) -> f32 {
        if self.target == 0 {
            1.0
        } else {
            (self.current as f64 / self.target as f64) as f32
        }
    }
}

/// Display formatting for counter values, e.g. `"1,200+"` or `"98%"`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CounterFormat {
    pub prefix: String,
    pub suffix: String,
    /// Thousands separator, if any
    pub separator: Option<char>,
}

impl CounterFormat {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    pub fn format(&self, value: u64) -> String {
        let digits = value.to_string();
        let body = match self.separator {
            Some(sep) => group_thousands(&digits, sep),
            None => digits,
        };
        format!("{}{}{}", self.prefix, body, self.suffix)
    }
}

fn group_thousands(digits: &str, sep: char) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(sep);
        }
        out.push(ch);
    }
    out
}
