//! Scene file handling (scene.toml)

use anyhow::{Context, Result};
use assay_animation::{
    CounterAnimator, CounterFormat, Easing, LoopMode, LoopingAnimator, SpringConfig,
    StaggerConfig,
};
use assay_core::error::{ensure_finite, ConfigError};
use assay_core::geometry::Rect;
use rustc_hash::FxHashSet;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// A problem found while validating a scene
#[derive(Debug, Error, PartialEq)]
pub enum SceneError {
    #[error("[scene]: {0}")]
    Scene(ConfigError),

    #[error("[scene]: tick_hz must be positive, got {0}")]
    TickRate(f64),

    #[error("`{element}`: {source}")]
    Element {
        element: String,
        #[source]
        source: ConfigError,
    },

    #[error("duplicate element id `{0}`")]
    DuplicateId(String),

    #[error("stagger `{0}` needs either `items` or `text`")]
    EmptyStagger(String),

    #[error("`{element}`: hidden_at ({hidden_at}s) is before visible_at ({visible_at}s)")]
    HiddenBeforeVisible {
        element: String,
        visible_at: f64,
        hidden_at: f64,
    },
}

/// Top-level scene configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    pub scene: SceneMeta,
    #[serde(default, rename = "counter")]
    pub counters: Vec<CounterConfig>,
    #[serde(default, rename = "stagger")]
    pub staggers: Vec<StaggerSceneConfig>,
    #[serde(default, rename = "spotlight")]
    pub spotlights: Vec<SpotlightConfig>,
    #[serde(default, rename = "loop")]
    pub loops: Vec<LoopConfig>,
}

/// Scene metadata and default run length
#[derive(Debug, Clone, Deserialize)]
pub struct SceneMeta {
    pub name: String,
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f64,
    #[serde(default = "default_seconds")]
    pub seconds: f64,
}

fn default_tick_hz() -> f64 {
    assay_core::clock::DEFAULT_TICK_HZ
}

fn default_seconds() -> f64 {
    3.0
}

/// When an element is in the viewport
///
/// With no `visible_at` the element never scrolls into view.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct VisibilityWindow {
    #[serde(default)]
    pub visible_at: Option<f64>,
    #[serde(default)]
    pub hidden_at: Option<f64>,
}

impl VisibilityWindow {
    pub fn is_visible(&self, now: f64) -> bool {
        let shown = self.visible_at.is_some_and(|at| now >= at);
        let hidden = self.hidden_at.is_some_and(|at| now >= at);
        shown && !hidden
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CounterConfig {
    pub id: String,
    pub target: u64,
    #[serde(default = "default_counter_duration")]
    pub duration: f64,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    #[serde(default)]
    pub separator: Option<char>,
    #[serde(flatten)]
    pub window: VisibilityWindow,
}

fn default_counter_duration() -> f64 {
    2.0
}

impl CounterConfig {
    pub fn format(&self) -> CounterFormat {
        let format = CounterFormat::new()
            .prefix(self.prefix.clone())
            .suffix(self.suffix.clone());
        match self.separator {
            Some(sep) => format.separator(sep),
            None => format,
        }
    }
}

/// Curve names accepted in scene files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EasingName {
    Linear,
    Ease,
    EaseIn,
    #[default]
    EaseOut,
    EaseInOut,
}

impl From<EasingName> for Easing {
    fn from(name: EasingName) -> Self {
        match name {
            EasingName::Linear => Easing::Linear,
            EasingName::Ease => Easing::Ease,
            EasingName::EaseIn => Easing::EaseIn,
            EasingName::EaseOut => Easing::EaseOut,
            EasingName::EaseInOut => Easing::EaseInOut,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StaggerSceneConfig {
    pub id: String,
    #[serde(default)]
    pub items: Vec<String>,
    /// Revealed word by word instead of `items`
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default = "default_stagger_delay")]
    pub delay: f64,
    #[serde(default)]
    pub delay_children: f64,
    #[serde(default = "default_item_duration")]
    pub item_duration: f64,
    #[serde(default)]
    pub easing: EasingName,
    #[serde(flatten)]
    pub window: VisibilityWindow,
}

fn default_stagger_delay() -> f64 {
    0.1
}

fn default_item_duration() -> f64 {
    0.5
}

impl StaggerSceneConfig {
    pub fn stagger_config(&self) -> StaggerConfig {
        StaggerConfig::new(self.delay)
            .delay_children(self.delay_children)
            .item_duration(self.item_duration)
            .easing(self.easing.into())
    }
}

/// One step of a scripted pointer
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointerStep {
    pub at: f64,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    /// Pointer leaves the element instead of moving
    #[serde(default)]
    pub leave: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotlightConfig {
    pub id: String,
    #[serde(default = "default_stiffness")]
    pub stiffness: f32,
    #[serde(default = "default_damping")]
    pub damping: f32,
    #[serde(default = "default_mass")]
    pub mass: f32,
    /// Card rectangle `[x, y, width, height]` in page coordinates; pointer
    /// steps are page coordinates and get converted into it
    #[serde(default)]
    pub bounds: Option<[f32; 4]>,
    #[serde(default)]
    pub pointer: Vec<PointerStep>,
}

fn default_stiffness() -> f32 {
    SpringConfig::spotlight().stiffness
}

fn default_damping() -> f32 {
    SpringConfig::spotlight().damping
}

fn default_mass() -> f32 {
    1.0
}

impl SpotlightConfig {
    pub fn spring_config(&self) -> SpringConfig {
        SpringConfig::new(self.stiffness, self.damping).with_mass(self.mass)
    }

    pub fn bounds(&self) -> Rect {
        match self.bounds {
            Some([x, y, width, height]) => Rect::new(x, y, width, height),
            None => Rect::default(),
        }
    }

    /// Pointer script ordered by time
    pub fn script(&self) -> Vec<PointerStep> {
        let mut steps = self.pointer.clone();
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        steps
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopKind {
    #[default]
    Spin,
    Pulse,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LoopModeName {
    #[default]
    Restart,
    Reverse,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoopConfig {
    pub id: String,
    #[serde(default)]
    pub kind: LoopKind,
    pub period: f64,
    #[serde(default)]
    pub offset: f64,
    #[serde(default)]
    pub mode: LoopModeName,
}

impl LoopConfig {
    pub fn animator(&self) -> LoopingAnimator {
        let animator = match self.kind {
            LoopKind::Spin => LoopingAnimator::spin(self.period),
            LoopKind::Pulse => LoopingAnimator::pulse_opacity(self.period),
        };
        let mode = match self.mode {
            LoopModeName::Restart => LoopMode::Restart,
            LoopModeName::Reverse => LoopMode::Reverse,
        };
        animator.offset(self.offset).mode(mode)
    }
}

impl SceneConfig {
    /// Load a scene from a file, or from `scene.toml` in a directory
    pub fn load(path: &Path) -> Result<Self> {
        let scene_path = if path.is_dir() {
            path.join("scene.toml")
        } else {
            path.to_path_buf()
        };

        if !scene_path.exists() {
            anyhow::bail!(
                "No scene found at {}. Run `assay init` to create one.",
                scene_path.display()
            );
        }

        let content = fs::read_to_string(&scene_path)
            .with_context(|| format!("Failed to read {}", scene_path.display()))?;

        Self::parse(&content).with_context(|| format!("Failed to parse {}", scene_path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Every problem in the scene. The runtime would clamp these silently.
    pub fn validate(&self) -> Vec<SceneError> {
        let mut errors = Vec::new();

        match ensure_finite("tick_hz", self.scene.tick_hz) {
            Ok(hz) if hz <= 0.0 => errors.push(SceneError::TickRate(hz)),
            Ok(_) => {}
            Err(err) => errors.push(SceneError::Scene(err)),
        }
        if let Err(err) = ensure_finite("seconds", self.scene.seconds) {
            errors.push(SceneError::Scene(err));
        }

        let mut seen = FxHashSet::default();
        let mut check_id = |id: &str, errors: &mut Vec<SceneError>| {
            if !seen.insert(id.to_string()) {
                errors.push(SceneError::DuplicateId(id.to_string()));
            }
        };

        let element = |id: &str, source: ConfigError| SceneError::Element {
            element: id.to_string(),
            source,
        };

        for counter in &self.counters {
            check_id(&counter.id, &mut errors);
            if let Err(err) = CounterAnimator::validate(counter.duration) {
                errors.push(element(&counter.id, err));
            }
            check_window(&counter.id, &counter.window, &mut errors);
        }

        for stagger in &self.staggers {
            check_id(&stagger.id, &mut errors);
            let has_text = stagger
                .text
                .as_deref()
                .is_some_and(|text| !text.trim().is_empty());
            if stagger.items.is_empty() && !has_text {
                errors.push(SceneError::EmptyStagger(stagger.id.clone()));
            }
            if let Err(err) = stagger.stagger_config().validate() {
                errors.push(element(&stagger.id, err));
            }
            check_window(&stagger.id, &stagger.window, &mut errors);
        }

        for spotlight in &self.spotlights {
            check_id(&spotlight.id, &mut errors);
            if let Err(err) = spotlight.spring_config().validate() {
                errors.push(element(&spotlight.id, err));
            }
            for step in &spotlight.pointer {
                if let Err(err) = ensure_finite("pointer.at", step.at) {
                    errors.push(element(&spotlight.id, err));
                }
            }
        }

        for lp in &self.loops {
            check_id(&lp.id, &mut errors);
            if let Err(err) = LoopingAnimator::validate(lp.period) {
                errors.push(element(&lp.id, err));
            }
        }

        errors
    }
}

fn check_window(id: &str, window: &VisibilityWindow, errors: &mut Vec<SceneError>) {
    for (field, value) in [("visible_at", window.visible_at), ("hidden_at", window.hidden_at)] {
        if let Some(value) = value {
            if let Err(source) = ensure_finite(field, value) {
                errors.push(SceneError::Element {
                    element: id.to_string(),
                    source,
                });
            }
        }
    }
    if let (Some(visible_at), Some(hidden_at)) = (window.visible_at, window.hidden_at) {
        if hidden_at < visible_at {
            errors.push(SceneError::HiddenBeforeVisible {
                element: id.to_string(),
                visible_at,
                hidden_at,
            });
        }
    }
}
