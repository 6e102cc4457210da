//! Spring smoothing
//!
//! A damped spring pulls a smoothed value toward a raw signal that may
//! jump around at any rate (pointer moves). Integration is semi-implicit
//! Euler on fixed sub-steps, which stays stable for UI stiffness and damping
//! at any frame rate.

use assay_core::error::ConfigError;
use assay_core::events::PointerSample;

/// Largest integration step, in seconds
pub const MAX_STEP: f32 = 1.0 / 240.0;

/// Frames longer than this many sub-steps snap straight to rest
pub const MAX_SUBSTEPS: u32 = 480;

/// Distance and speed below which the spring is considered at rest
const REST_EPSILON: f32 = 1e-3;

/// Stiffness range the smoother is tuned for
pub const STIFFNESS_RANGE: (f32, f32) = (50.0, 400.0);

/// Damping range the smoother is tuned for
pub const DAMPING_RANGE: (f32, f32) = (10.0, 40.0);

/// Configuration for a spring
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    pub fn new(stiffness: f32, damping: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass: 1.0,
        }
    }

    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = mass;
        self
    }

    /// The pointer spotlight's default feel
    pub fn spotlight() -> Self {
        Self::new(150.0, 15.0)
    }

    /// A gentle, slow spring
    pub fn gentle() -> Self {
        Self::new(120.0, 14.0)
    }

    /// Fast follow with a little overshoot
    pub fn snappy() -> Self {
        Self::new(400.0, 30.0)
    }

    /// Slow follow without overshoot
    pub fn molasses() -> Self {
        Self::new(100.0, 20.0)
    }

    /// Critical damping for this stiffness and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Whether the spring overshoots its target
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// Report parameters outside the tuned range
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("stiffness", self.stiffness, STIFFNESS_RANGE)?;
        check_range("damping", self.damping, DAMPING_RANGE)?;
        if !self.mass.is_finite() || self.mass <= 0.0 {
            return Err(ConfigError::SpringOutOfRange {
                field: "mass",
                value: self.mass,
                min: f32::MIN_POSITIVE,
                max: f32::MAX,
            });
        }
        Ok(())
    }

    /// Replace unusable values; in-range and merely untuned values pass
    fn sanitized(self) -> Self {
        if let Err(err) = self.validate() {
            tracing::warn!(%err, "spring parameters outside tuned range");
        }
        let fallback = Self::spotlight();
        let usable = |v: f32, min: f32| v.is_finite() && v >= min;
        Self {
            stiffness: if usable(self.stiffness, f32::MIN_POSITIVE) {
                self.stiffness
            } else {
                fallback.stiffness
            },
            damping: if usable(self.damping, 0.0) {
                self.damping
            } else {
                fallback.damping
            },
            mass: if usable(self.mass, f32::MIN_POSITIVE) {
                self.mass
            } else {
                1.0
            },
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::spotlight()
    }
}

fn check_range(field: &'static str, value: f32, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::SpringOutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Spring-smoothed scalar
#[derive(Clone, Copy, Debug)]
pub struct SpringSmoother {
    config: SpringConfig,
    raw: f32,
    value: f32,
    velocity: f32,
}

impl SpringSmoother {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        let initial = if initial.is_finite() { initial } else { 0.0 };
        Self {
            config: config.sanitized(),
            raw: initial,
            value: initial,
            velocity: 0.0,
        }
    }

    /// Record a new raw value without advancing time
    ///
    /// Non-finite input is ignored.
    pub fn set_raw(&mut self, raw: f32) {
        if raw.is_finite() {
            self.raw = raw;
        }
    }

    /// Set the raw value and advance by `dt` seconds
    pub fn update(&mut self, raw: f32, dt: f32) -> f32 {
        self.set_raw(raw);
        self.step(dt)
    }

    /// Advance by `dt` seconds toward the current raw value
    pub fn step(&mut self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 || self.is_settled() {
            return self.value;
        }

        let substeps = (dt / MAX_STEP).ceil();
        if substeps > MAX_SUBSTEPS as f32 {
            tracing::debug!(dt, "frame gap too long for spring, snapping to rest");
            self.snap_to_raw();
            return self.value;
        }

        let substeps = (substeps as u32).max(1);
        let h = dt / substeps as f32;
        for _ in 0..substeps {
            self.integrate(h);
        }

        if self.is_settled() {
            self.snap_to_raw();
        }
        self.value
    }

    fn integrate(&mut self, h: f32) {
        let SpringConfig {
            stiffness,
            damping,
            mass,
        } = self.config;
        let force = stiffness * (self.raw - self.value) - damping * self.velocity;
        self.velocity += force / mass * h;
        self.value += self.velocity * h;
    }

    /// Jump to the raw value and stop
    pub fn snap_to_raw(&mut self) {
        self.value = self.raw;
        self.velocity = 0.0;
    }

    /// Within the rest band of the raw value with negligible speed
    pub fn is_settled(&self) -> bool {
        (self.raw - self.value).abs() < REST_EPSILON && self.velocity.abs() < REST_EPSILON
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn raw(&self) -> f32 {
        self.raw
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn config(&self) -> &SpringConfig {
        &self.config
    }
}

/// Pointer spotlight: two spring channels sharing one configuration
///
/// The channels are independent; they are only stepped in lockstep. An
/// extra intensity spring fades the spotlight in on hover and out when the
/// pointer leaves.
#[derive(Clone, Copy, Debug)]
pub struct Spotlight {
    x: SpringSmoother,
    y: SpringSmoother,
    intensity: SpringSmoother,
}

impl Spotlight {
    pub fn new(config: SpringConfig, origin: PointerSample) -> Self {
        Self {
            x: SpringSmoother::new(config, origin.x),
            y: SpringSmoother::new(config, origin.y),
            intensity: SpringSmoother::new(config, 0.0),
        }
    }

    /// Feed a raw pointer position (element-local)
    pub fn set_pointer(&mut self, pointer: PointerSample) {
        if !pointer.is_finite() {
            return;
        }
        self.x.set_raw(pointer.x);
        self.y.set_raw(pointer.y);
        self.intensity.set_raw(1.0);
    }

    /// The pointer left the element; the position stays where it was
    pub fn pointer_leave(&mut self) {
        self.intensity.set_raw(0.0);
    }

    /// Advance both channels by `dt`
    pub fn step(&mut self, dt: f32) -> PointerSample {
        self.intensity.step(dt);
        PointerSample::new(self.x.step(dt), self.y.step(dt))
    }

    /// Set the pointer and advance in one call
    pub fn update(&mut self, pointer: PointerSample, dt: f32) -> PointerSample {
        self.set_pointer(pointer);
        self.step(dt)
    }

    /// Smoothed position
    pub fn position(&self) -> PointerSample {
        PointerSample::new(self.x.value(), self.y.value())
    }

    /// Spotlight opacity in `0.0..=1.0`
    pub fn intensity(&self) -> f32 {
        self.intensity.value().clamp(0.0, 1.0)
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled() && self.intensity.is_settled()
    }

    pub fn channels(&self) -> (&SpringSmoother, &SpringSmoother) {
        (&self.x, &self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_converges_across_tuned_range() {
        for stiffness in [50.0, 120.0, 200.0, 400.0] {
            for damping in [10.0, 20.0, 30.0, 40.0] {
                let mut spring = SpringSmoother::new(SpringConfig::new(stiffness, damping), 0.0);
                for _ in 0..(60 * 10) {
                    spring.update(100.0, DT);
                }
                assert!(
                    (spring.value() - 100.0).abs() < 1e-2,
                    "k={stiffness} c={damping} value={}",
                    spring.value()
                );
                assert!(spring.velocity().abs() < 1e-2);
            }
        }
    }

    #[test]
    fn test_no_oscillation_growth() {
        let mut spring = SpringSmoother::new(SpringConfig::new(400.0, 10.0), 0.0);
        spring.set_raw(100.0);

        let mut last_error = 100.0_f32;
        for _ in 0..(60 * 5) {
            spring.step(DT);
            let error = (spring.value() - 100.0).abs();
            assert!(spring.value().is_finite());
            // Overshoot is allowed, but bounded by the initial distance
            assert!(error <= 100.0 + 1e-3);
            last_error = error;
        }
        assert!(last_error < 1.0);
    }

    #[test]
    fn test_lags_behind_raw() {
        let mut spring = SpringSmoother::new(SpringConfig::new(200.0, 30.0), 0.0);
        let after_one_frame = spring.update(100.0, DT);
        assert!(after_one_frame > 0.0 && after_one_frame < 50.0);
    }

    #[test]
    fn test_bursty_input_uses_latest_raw() {
        let mut spring = SpringSmoother::new(SpringConfig::new(200.0, 30.0), 0.0);
        for x in [10.0, 500.0, -30.0, 80.0] {
            spring.set_raw(x);
        }
        for _ in 0..120 {
            spring.step(DT);
        }
        assert!((spring.value() - 80.0).abs() < 1.0);
    }

    #[test]
    fn test_long_gap_snaps() {
        let mut spring = SpringSmoother::new(SpringConfig::new(200.0, 30.0), 0.0);
        spring.set_raw(50.0);
        assert_eq!(spring.step(10.0), 50.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn test_ignores_bad_input() {
        let mut spring = SpringSmoother::new(SpringConfig::new(200.0, 30.0), 5.0);
        spring.set_raw(f32::NAN);
        assert_eq!(spring.raw(), 5.0);
        assert_eq!(spring.step(-1.0), 5.0);
        assert_eq!(spring.step(f32::INFINITY), 5.0);
    }

    #[test]
    fn test_unusable_config_falls_back() {
        let spring = SpringSmoother::new(SpringConfig::new(f32::NAN, -3.0).with_mass(0.0), 0.0);
        assert_eq!(spring.config().stiffness, SpringConfig::spotlight().stiffness);
        assert_eq!(spring.config().damping, SpringConfig::spotlight().damping);
        assert_eq!(spring.config().mass, 1.0);
    }

    #[test]
    fn test_validate_range() {
        assert!(SpringConfig::new(200.0, 30.0).validate().is_ok());
        assert!(matches!(
            SpringConfig::new(1000.0, 30.0).validate(),
            Err(ConfigError::SpringOutOfRange {
                field: "stiffness",
                ..
            })
        ));
        assert!(SpringConfig::new(200.0, 5.0).validate().is_err());
    }

    #[test]
    fn test_presets() {
        assert!(SpringConfig::gentle().is_underdamped());
        assert!(SpringConfig::spotlight().is_underdamped());
        assert!(!SpringConfig::new(200.0, 30.0).is_underdamped());
    }

    #[test]
    fn test_spotlight_pointer_jump() {
        let mut spotlight = Spotlight::new(SpringConfig::new(200.0, 30.0), PointerSample::default());
        spotlight.set_pointer(PointerSample::new(100.0, 100.0));

        for _ in 0..60 {
            spotlight.step(DT);
        }
        let pos = spotlight.position();
        assert!((pos.x - 100.0).abs() < 1.0, "x = {}", pos.x);
        assert!((pos.y - 100.0).abs() < 1.0, "y = {}", pos.y);
        assert!(spotlight.intensity() > 0.99);
    }

    #[test]
    fn test_spotlight_channels_are_independent() {
        let mut spotlight = Spotlight::new(SpringConfig::spotlight(), PointerSample::default());
        spotlight.update(PointerSample::new(100.0, 0.0), DT);
        let (x, y) = spotlight.channels();
        assert!(x.value() > 0.0);
        assert_eq!(y.value(), 0.0);
    }

    #[test]
    fn test_spotlight_leave_fades() {
        let mut spotlight = Spotlight::new(SpringConfig::new(200.0, 30.0), PointerSample::default());
        spotlight.set_pointer(PointerSample::new(40.0, 40.0));
        for _ in 0..60 {
            spotlight.step(DT);
        }
        spotlight.pointer_leave();
        for _ in 0..120 {
            spotlight.step(DT);
        }
        assert!(spotlight.intensity() < 0.01);
        assert!((spotlight.position().x - 40.0).abs() < 1.0);
        assert!(spotlight.is_settled());
    }
}
