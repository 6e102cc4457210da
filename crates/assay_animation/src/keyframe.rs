//! Keyframe tracks
//!
//! A track maps normalized progress to a value through a list of keyframes.
//! Loops sample tracks by phase (the opacity pulse is `0.5 -> 1.0 -> 0.5`),
//! reveal styles sample them by transition progress.

use crate::easing::Easing;
use smallvec::SmallVec;

/// A single keyframe
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Keyframe {
    /// Time position (0.0 to 1.0)
    pub time: f32,
    /// Value at this keyframe
    pub value: f32,
    /// Easing used when transitioning TO this keyframe
    pub easing: Easing,
}

impl Keyframe {
    pub fn new(time: f32, value: f32, easing: Easing) -> Self {
        Self {
            time,
            value,
            easing,
        }
    }

    pub fn linear(time: f32, value: f32) -> Self {
        Self::new(time, value, Easing::Linear)
    }
}

/// An ordered list of keyframes
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyframeTrack {
    keyframes: SmallVec<[Keyframe; 4]>,
}

impl KeyframeTrack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evenly spaced linear keyframes, `values[0]` at 0.0 and the last at 1.0
    pub fn evenly(values: &[f32], easing: Easing) -> Self {
        let mut track = Self::new();
        match values.len() {
            0 => {}
            1 => track = track.keyframe(0.0, values[0], Easing::Linear),
            n => {
                let last = (n - 1) as f32;
                for (i, value) in values.iter().enumerate() {
                    let ease = if i == 0 { Easing::Linear } else { easing };
                    track = track.keyframe(i as f32 / last, *value, ease);
                }
            }
        }
        track
    }

    /// Builder: add a keyframe, keeping the track sorted by time
    pub fn keyframe(mut self, time: f32, value: f32, easing: Easing) -> Self {
        self.push(Keyframe::new(time, value, easing));
        self
    }

    /// Insert a keyframe; non-finite times are dropped, times are clamped
    /// into the unit range
    pub fn push(&mut self, mut keyframe: Keyframe) {
        if !keyframe.time.is_finite() || !keyframe.value.is_finite() {
            tracing::warn!(?keyframe, "dropping non-finite keyframe");
            return;
        }
        keyframe.time = keyframe.time.clamp(0.0, 1.0);
        let at = self
            .keyframes
            .iter()
            .position(|k| k.time > keyframe.time)
            .unwrap_or(self.keyframes.len());
        self.keyframes.insert(at, keyframe);
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Interpolated value at `progress` (clamped to 0.0..=1.0)
    ///
    /// Empty tracks sample as 0. Before the first keyframe the first value
    /// holds, after the last the last value holds.
    pub fn sample(&self, progress: f32) -> f32 {
        let Some(first) = self.keyframes.first() else {
            return 0.0;
        };
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };

        let mut prev = first;
        let mut next = first;
        for kf in &self.keyframes {
            if kf.time <= progress {
                prev = kf;
            }
            if kf.time >= progress {
                next = kf;
                break;
            }
            next = kf;
        }

        let span = next.time - prev.time;
        if span.abs() < f32::EPSILON {
            return if progress < next.time { prev.value } else { next.value };
        }

        let local = (progress - prev.time) / span;
        let eased = next.easing.apply(local);
        prev.value + (next.value - prev.value) * eased
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pulse_track() {
        let track = KeyframeTrack::evenly(&[0.5, 1.0, 0.5], Easing::Linear);

        assert_eq!(track.sample(0.0), 0.5);
        assert_eq!(track.sample(0.5), 1.0);
        assert_eq!(track.sample(1.0), 0.5);
        assert!((track.sample(0.25) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_holds_outside_keyframes() {
        let track = KeyframeTrack::new()
            .keyframe(0.2, 10.0, Easing::Linear)
            .keyframe(0.8, 20.0, Easing::Linear);

        assert_eq!(track.sample(0.0), 10.0);
        assert_eq!(track.sample(1.0), 20.0);
        assert!((track.sample(0.5) - 15.0).abs() < 1e-5);
    }

    #[test]
    fn test_keyframes_stay_sorted() {
        let track = KeyframeTrack::new()
            .keyframe(1.0, 3.0, Easing::Linear)
            .keyframe(0.0, 1.0, Easing::Linear)
            .keyframe(0.5, 2.0, Easing::Linear);

        let times: Vec<f32> = track.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(KeyframeTrack::new().sample(0.3), 0.0);
        assert_eq!(KeyframeTrack::evenly(&[4.0], Easing::Linear).sample(0.9), 4.0);
    }

    #[test]
    fn test_non_finite_keyframe_dropped() {
        let track = KeyframeTrack::new().keyframe(f32::NAN, 1.0, Easing::Linear);
        assert!(track.is_empty());
    }
}
