//! Visibility triggers
//!
//! Whether an element is in the viewport is decided by the host platform.
//! The core only consumes a boolean per element, either sampled every frame
//! through a [`VisibilitySource`] or pushed as events into a
//! [`VisibilityMap`]. Animators turn the first `true` into a permanent
//! start time with a [`VisibilityLatch`].

use crate::geometry::Rect;
use rustc_hash::FxHashMap;

/// Identifier of a UI element, assigned by the host
pub type ElementId = u64;

/// Anything that can answer "is this element on screen right now"
pub trait VisibilitySource {
    fn is_visible(&self, element: ElementId) -> bool;
}

impl<F: Fn(ElementId) -> bool> VisibilitySource for F {
    fn is_visible(&self, element: ElementId) -> bool {
        self(element)
    }
}

/// Source for elements that are always on screen
#[derive(Clone, Copy, Debug, Default)]
pub struct AlwaysVisible;

impl VisibilitySource for AlwaysVisible {
    fn is_visible(&self, _element: ElementId) -> bool {
        true
    }
}

/// Event-fed visibility state
///
/// Elements that never reported are treated as not visible.
#[derive(Clone, Debug, Default)]
pub struct VisibilityMap {
    visible: FxHashMap<ElementId, bool>,
}

impl VisibilityMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the latest visibility of an element
    pub fn set(&mut self, element: ElementId, visible: bool) {
        self.visible.insert(element, visible);
    }

    /// Forget an element (on unmount)
    pub fn remove(&mut self, element: ElementId) {
        self.visible.remove(&element);
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }
}

impl VisibilitySource for VisibilityMap {
    fn is_visible(&self, element: ElementId) -> bool {
        self.visible.get(&element).copied().unwrap_or(false)
    }
}

/// How much of an element must be inside the viewport to count as visible
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewportOptions {
    /// Required visible fraction of the element. `0.0` means any overlap.
    pub amount: f32,
    /// Pixels added around the viewport before testing (negative shrinks it)
    pub margin: f32,
}

impl ViewportOptions {
    pub fn amount(mut self, amount: f32) -> Self {
        self.amount = amount;
        self
    }

    pub fn margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    /// Decide visibility of `element` against `viewport`
    pub fn is_visible(&self, element: &Rect, viewport: &Rect) -> bool {
        let margin = if self.margin.is_finite() {
            self.margin
        } else {
            0.0
        };
        let ratio = element.intersection_ratio(&viewport.expand(margin));
        let amount = if self.amount.is_finite() {
            self.amount.clamp(0.0, 1.0)
        } else {
            0.0
        };

        if amount <= 0.0 {
            ratio > 0.0
        } else {
            ratio >= amount
        }
    }
}

/// One-shot start latch
///
/// The first `true` observation records the timestamp; nothing afterwards
/// can clear or move it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VisibilityLatch {
    latched_at: Option<f64>,
}

impl VisibilityLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current visibility; returns the latched start time, if any
    pub fn observe(&mut self, visible: bool, now: f64) -> Option<f64> {
        if self.latched_at.is_none() && visible {
            self.latched_at = Some(now);
            tracing::trace!(at = now, "visibility latch fired");
        }
        self.latched_at
    }

    pub fn latched_at(&self) -> Option<f64> {
        self.latched_at
    }

    pub fn is_latched(&self) -> bool {
        self.latched_at.is_some()
    }
}
