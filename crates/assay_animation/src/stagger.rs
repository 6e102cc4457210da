//! Staggered reveals
//!
//! Once a group first becomes visible, item `i` reveals at
//! `started + delay_children + i * delay`. Delays are non-negative, so the
//! revealed set is always a prefix of the items; it is tracked as a
//! high-water mark and never shrinks.
//!
//! The same sequencer drives flat lists (stats, FAQ entries) and
//! word-by-word headings via [`StaggerGroup::words`].

use std::ops::Range;

use assay_core::error::{ensure_finite, ConfigError};
use assay_core::visibility::VisibilityLatch;

use crate::easing::Easing;
use crate::reveal::RevealState;

/// Timing of a staggered group
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StaggerConfig {
    /// Seconds between consecutive items
    pub delay: f64,
    /// Seconds between the group starting and the first item
    pub delay_children: f64,
    /// Length of each item's reveal transition
    pub item_duration: f64,
    /// Curve of each item's reveal transition
    pub easing: Easing,
}

impl StaggerConfig {
    pub fn new(delay: f64) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn delay_children(mut self, seconds: f64) -> Self {
        self.delay_children = seconds;
        self
    }

    pub fn item_duration(mut self, seconds: f64) -> Self {
        self.item_duration = seconds;
        self
    }

    pub fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Report the first value that would be clamped
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("delay", self.delay),
            ("delay_children", self.delay_children),
            ("item_duration", self.item_duration),
        ] {
            let value = ensure_finite(field, value)?;
            if value < 0.0 {
                return Err(ConfigError::NegativeDelay(value));
            }
        }
        Ok(())
    }

    /// Negative and non-finite timings become 0
    fn sanitized(self) -> Self {
        if let Err(err) = self.validate() {
            tracing::warn!(%err, "clamping stagger timing");
        }
        let clamp = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            delay: clamp(self.delay),
            delay_children: clamp(self.delay_children),
            item_duration: clamp(self.item_duration),
            easing: self.easing,
        }
    }
}

impl Default for StaggerConfig {
    fn default() -> Self {
        Self {
            delay: 0.1,
            delay_children: 0.0,
            item_duration: 0.5,
            easing: Easing::EaseOut,
        }
    }
}

/// Count-based stagger sequencer
#[derive(Clone, Debug)]
pub struct Stagger {
    len: usize,
    config: StaggerConfig,
    latch: VisibilityLatch,
    revealed: usize,
}

impl Stagger {
    /// `len` items revealed `delay` seconds apart
    pub fn new(len: usize, delay: f64) -> Self {
        Self::with_config(len, StaggerConfig::new(delay))
    }

    pub fn with_config(len: usize, config: StaggerConfig) -> Self {
        Self {
            len,
            config: config.sanitized(),
            latch: VisibilityLatch::new(),
            revealed: 0,
        }
    }

    /// Advance to `now`; returns the revealed index range
    pub fn tick(&mut self, visible: bool, now: f64) -> Range<usize> {
        let was_started = self.latch.is_latched();
        let Some(started_at) = self.latch.observe(visible, now) else {
            return 0..0;
        };
        if !was_started {
            tracing::debug!(items = self.len, at = now, "stagger group started");
        }

        if self.revealed < self.len {
            let count = self.count_at(started_at, now);
            if count > self.revealed {
                tracing::trace!(from = self.revealed, to = count, "stagger reveal");
                self.revealed = count;
            }
        }
        self.revealed()
    }

    /// Number of items with `reveal_at(i) <= now`
    fn count_at(&self, started_at: f64, now: f64) -> usize {
        let first = started_at + self.config.delay_children;
        if now < first || self.len == 0 {
            return 0;
        }
        if self.config.delay == 0.0 {
            return self.len;
        }

        // Estimate, then settle against the exact reveal times
        let estimate = ((now - first) / self.config.delay).floor() + 1.0;
        let mut count = if estimate >= self.len as f64 {
            self.len
        } else {
            estimate as usize
        };
        while count < self.len && self.reveal_time(started_at, count) <= now {
            count += 1;
        }
        while count > 0 && self.reveal_time(started_at, count - 1) > now {
            count -= 1;
        }
        count
    }

    fn reveal_time(&self, started_at: f64, index: usize) -> f64 {
        started_at + self.config.delay_children + index as f64 * self.config.delay
    }

    /// When item `index` reveals, once the group has started
    pub fn reveal_at(&self, index: usize) -> Option<f64> {
        if index >= self.len {
            return None;
        }
        self.latch
            .latched_at()
            .map(|started| self.reveal_time(started, index))
    }

    /// Indices revealed so far
    pub fn revealed(&self) -> Range<usize> {
        0..self.revealed
    }

    pub fn is_revealed(&self, index: usize) -> bool {
        index < self.revealed
    }

    /// Visual state of one item at `now`
    pub fn item_state(&self, index: usize, now: f64) -> RevealState {
        match self.reveal_at(index) {
            Some(at) if self.is_revealed(index) => {
                RevealState::at(now.max(at), at, self.config.item_duration, self.config.easing)
            }
            _ => RevealState::Hidden,
        }
    }

    /// Eased transition progress of one item at `now`
    pub fn item_progress(&self, index: usize, now: f64) -> f32 {
        self.item_state(index, now).progress()
    }

    /// Every item has finished its transition
    pub fn is_complete(&self, now: f64) -> bool {
        if self.len == 0 {
            return self.latch.is_latched();
        }
        self.revealed == self.len && self.item_state(self.len - 1, now).is_settled()
    }

    pub fn started_at(&self) -> Option<f64> {
        self.latch.latched_at()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn config(&self) -> &StaggerConfig {
        &self.config
    }
}

/// Split text on whitespace into the tokens of a word-by-word reveal
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// A stagger sequencer paired with the items it reveals
#[derive(Clone, Debug)]
pub struct StaggerGroup<T> {
    items: Vec<T>,
    stagger: Stagger,
}

impl<T> StaggerGroup<T> {
    pub fn new(items: Vec<T>, delay: f64) -> Self {
        Self::with_config(items, StaggerConfig::new(delay))
    }

    pub fn with_config(items: Vec<T>, config: StaggerConfig) -> Self {
        let stagger = Stagger::with_config(items.len(), config);
        Self { items, stagger }
    }

    /// Advance to `now`; returns the revealed items
    pub fn tick(&mut self, visible: bool, now: f64) -> &[T] {
        let range = self.stagger.tick(visible, now);
        &self.items[range]
    }

    pub fn revealed(&self) -> &[T] {
        &self.items[self.stagger.revealed()]
    }

    /// Items with their visual state at `now`
    pub fn states(&self, now: f64) -> impl Iterator<Item = (&T, RevealState)> + '_ {
        self.items
            .iter()
            .enumerate()
            .map(move |(i, item)| (item, self.stagger.item_state(i, now)))
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn stagger(&self) -> &Stagger {
        &self.stagger
    }
}

impl StaggerGroup<String> {
    /// Word-by-word reveal of `text`
    pub fn words(text: &str, config: StaggerConfig) -> Self {
        let words = split_words(text).into_iter().map(str::to_owned).collect();
        Self::with_config(words, config)
    }
}
