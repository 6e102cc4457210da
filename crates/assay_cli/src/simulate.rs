//! Headless scene simulation
//!
//! Mounts every element of a scene on a [`MotionScheduler`], replays the
//! visibility windows and pointer scripts against a manual clock, and
//! records what a renderer would draw.

use anyhow::Result;
use assay_animation::{
    AnimatedCounter, AnimatedLoop, AnimatedSpotlight, AnimatedStagger, MotionScheduler,
    RevealStyle,
};
use assay_core::clock::{FixedRate, FrameTicker, ManualClock};
use assay_core::events::PointerSample;
use assay_core::geometry::Rect;
use assay_core::visibility::{ElementId, VisibilityMap};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::{debug, info};

use crate::config::{PointerStep, SceneConfig, VisibilityWindow};

/// Longest run accepted, in frames (about 4.6 hours at 60 Hz)
pub const MAX_FRAMES: u64 = 1_000_000;

/// Command-line overrides for a run
#[derive(Debug, Clone, Default)]
pub struct SimulateOptions {
    pub hz: Option<f64>,
    pub seconds: Option<f64>,
    /// Record every n-th frame (the last frame is always recorded)
    pub every: usize,
}

/// What one element shows on a recorded frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementSample {
    Counter { value: u64, display: String },
    Stagger { revealed: usize, opacity: Vec<f32> },
    Spotlight { x: f32, y: f32, intensity: f32 },
    Loop { value: f32 },
}

/// One recorded frame
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub frame: u64,
    pub now: f64,
    pub elements: BTreeMap<String, ElementSample>,
}

enum Mounted {
    Counter(AnimatedCounter),
    Stagger(AnimatedStagger<String>),
    Spotlight {
        spotlight: AnimatedSpotlight,
        bounds: Rect,
        script: Vec<PointerStep>,
        next: usize,
    },
    Loop(AnimatedLoop),
}

struct Element {
    id: String,
    element: ElementId,
    window: Option<VisibilityWindow>,
    mounted: Mounted,
}

impl Element {
    fn sample(&self) -> ElementSample {
        match &self.mounted {
            Mounted::Counter(counter) => ElementSample::Counter {
                value: counter.get(),
                display: counter.display(),
            },
            Mounted::Stagger(stagger) => ElementSample::Stagger {
                revealed: stagger.revealed().len(),
                opacity: stagger
                    .states()
                    .into_iter()
                    .map(|(_, state)| RevealStyle::fade_up(state, 0.0).opacity)
                    .collect(),
            },
            Mounted::Spotlight { spotlight, .. } => {
                let at = spotlight.position();
                ElementSample::Spotlight {
                    x: at.x,
                    y: at.y,
                    intensity: spotlight.intensity(),
                }
            }
            Mounted::Loop(lp) => ElementSample::Loop { value: lp.get() },
        }
    }

    /// Replay pointer steps that are due
    fn drive_pointer(&mut self, now: f64) {
        if let Mounted::Spotlight {
            spotlight,
            bounds,
            script,
            next,
        } = &mut self.mounted
        {
            while let Some(step) = script.get(*next).filter(|step| step.at <= now) {
                if step.leave {
                    spotlight.pointer_leave();
                } else {
                    let (x, y) = bounds.to_local(step.x, step.y);
                    spotlight.set_pointer(PointerSample::new(x, y));
                }
                *next += 1;
            }
        }
    }
}

fn mount(scene: &SceneConfig, scheduler: &MotionScheduler) -> Vec<Element> {
    let handle = scheduler.handle();
    let mut elements = Vec::new();
    let mut next_id: ElementId = 0;
    let mut allocate = || {
        next_id += 1;
        next_id
    };

    for config in &scene.counters {
        let element = allocate();
        let counter = AnimatedCounter::new(handle.clone(), element, config.target, config.duration)
            .with_format(config.format());
        elements.push(Element {
            id: config.id.clone(),
            element,
            window: Some(config.window),
            mounted: Mounted::Counter(counter),
        });
    }

    for config in &scene.staggers {
        let element = allocate();
        let stagger = match &config.text {
            Some(text) if config.items.is_empty() => {
                AnimatedStagger::words(handle.clone(), element, text, config.stagger_config())
            }
            _ => AnimatedStagger::new(
                handle.clone(),
                element,
                config.items.clone(),
                config.stagger_config(),
            ),
        };
        elements.push(Element {
            id: config.id.clone(),
            element,
            window: Some(config.window),
            mounted: Mounted::Stagger(stagger),
        });
    }

    for config in &scene.spotlights {
        let element = allocate();
        elements.push(Element {
            id: config.id.clone(),
            element,
            window: None,
            mounted: Mounted::Spotlight {
                spotlight: AnimatedSpotlight::new(handle.clone(), element, config.spring_config()),
                bounds: config.bounds(),
                script: config.script(),
                next: 0,
            },
        });
    }

    for config in &scene.loops {
        let element = allocate();
        elements.push(Element {
            id: config.id.clone(),
            element,
            window: None,
            mounted: Mounted::Loop(AnimatedLoop::new(handle.clone(), element, config.animator())),
        });
    }

    debug!(elements = elements.len(), "mounted scene");
    elements
}

/// Run a scene and return the recorded frames
pub fn run(scene: &SceneConfig, options: &SimulateOptions) -> Result<Vec<Sample>> {
    let hz = options.hz.unwrap_or(scene.scene.tick_hz);
    let seconds = options.seconds.unwrap_or(scene.scene.seconds);
    let rate = FixedRate::new(hz);
    if rate.step().is_none() {
        anyhow::bail!("tick rate must be positive, got {hz}");
    }
    let frames = rate.frame_count(seconds);
    if frames > MAX_FRAMES {
        anyhow::bail!(
            "{seconds}s at {hz} Hz is {frames} frames, more than the limit of {MAX_FRAMES}"
        );
    }
    let every = options.every.max(1) as u64;

    let scheduler = MotionScheduler::new();
    let mut elements = mount(scene, &scheduler);

    let clock = ManualClock::new();
    let mut ticker = FrameTicker::new(&clock);
    let mut visibility = VisibilityMap::new();

    let last = frames - 1;
    let mut samples = Vec::new();

    info!(scene = %scene.scene.name, hz, seconds, "simulating");

    for now in rate.timestamps(seconds) {
        clock.set(now);

        for element in &mut elements {
            if let Some(window) = element.window {
                visibility.set(element.element, window.is_visible(now));
            }
            element.drive_pointer(now);
        }

        let tick = ticker.tick();
        scheduler.tick_with(tick, &visibility);

        if tick.frame % every == 0 || tick.frame == last {
            samples.push(Sample {
                frame: tick.frame,
                now: tick.now,
                elements: elements
                    .iter()
                    .map(|element| (element.id.clone(), element.sample()))
                    .collect(),
            });
        }
    }

    if scheduler.has_active_animations() {
        debug!("scene still animating at the end of the run");
    }

    // Elements release their state here, before the scheduler
    drop(elements);
    Ok(samples)
}

/// Render samples as a plain-text table
pub fn render_text(samples: &[Sample]) -> String {
    let mut out = String::new();
    for sample in samples {
        let _ = write!(out, "{:>5} {:>8.3}s", sample.frame, sample.now);
        for (id, value) in &sample.elements {
            let _ = match value {
                ElementSample::Counter { display, .. } => write!(out, "  {id}={display}"),
                ElementSample::Stagger { revealed, opacity } => {
                    write!(out, "  {id}={revealed}/{}", opacity.len())
                }
                ElementSample::Spotlight { x, y, intensity } => {
                    write!(out, "  {id}=({x:.1},{y:.1})@{intensity:.2}")
                }
                ElementSample::Loop { value } => write!(out, "  {id}={value:.2}"),
            };
        }
        out.push('\n');
    }
    out
}
