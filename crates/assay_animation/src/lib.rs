//! Assay Motion
//!
//! Entrance and ambient motion for marketing pages, driven by an injected
//! frame clock instead of timers.
//!
//! # Features
//!
//! - **Counters**: Count up to a target once the element is first seen
//! - **Staggered Reveals**: Lists and headings revealed item by item
//! - **Spring Smoothing**: Pointer-following spotlights that never overshoot wildly
//! - **Loops**: Rotations and pulses sampled as a pure function of time
//! - **Explicit Lifecycle**: Element state lives in a scheduler and is released on drop

pub mod counter;
pub mod easing;
pub mod keyframe;
pub mod looping;
pub mod reveal;
pub mod scheduler;
pub mod spring;
pub mod stagger;

pub use counter::{CounterAnimator, CounterFormat};
pub use easing::Easing;
pub use keyframe::{Keyframe, KeyframeTrack};
pub use looping::{phase, LoopMode, LoopTrack, LoopingAnimator};
pub use reveal::{RevealEvent, RevealState, RevealStyle};
pub use scheduler::{
    AnimatedCounter, AnimatedLoop, AnimatedSpotlight, AnimatedStagger, CounterId, LoopId,
    MotionScheduler, SchedulerHandle, SpotlightId, StaggerId,
};
pub use spring::{SpringConfig, SpringSmoother, Spotlight};
pub use stagger::{split_words, Stagger, StaggerConfig, StaggerGroup};
