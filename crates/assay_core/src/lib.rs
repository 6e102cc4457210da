//! Assay Core Runtime
//!
//! Platform-facing primitives for the Assay motion system:
//!
//! - **Frame Clocks**: wall-clock and manual time sources, frame ticks
//! - **Visibility**: per-element viewport signals and one-shot latches
//! - **Events**: pointer, visibility and teardown events from the host
//!
//! # Example
//!
//! ```rust
//! use assay_core::clock::{FrameTicker, ManualClock};
//! use assay_core::visibility::VisibilityLatch;
//!
//! let clock = ManualClock::new();
//! let mut ticker = FrameTicker::new(&clock);
//! let mut latch = VisibilityLatch::new();
//!
//! clock.advance(0.5);
//! let tick = ticker.tick();
//! assert_eq!(latch.observe(true, tick.now), Some(0.5));
//!
//! clock.advance(0.5);
//! let tick = ticker.tick();
//! assert_eq!(latch.observe(false, tick.now), Some(0.5));
//! ```

pub mod clock;
pub mod error;
pub mod events;
pub mod geometry;
pub mod visibility;

pub use clock::{FixedRate, FrameClock, FrameTick, FrameTicker, ManualClock, SystemClock};
pub use error::ConfigError;
pub use events::{EventType, FrameEvent, PointerSample};
pub use geometry::Rect;
pub use visibility::{
    AlwaysVisible, ElementId, ViewportOptions, VisibilityLatch, VisibilityMap, VisibilitySource,
};
