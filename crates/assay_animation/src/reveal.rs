//! Reveal state machine
//!
//! Every revealable element moves one way through
//! `Hidden -> Revealing -> Revealed`. There is no transition back: an element
//! that scrolled out of view after revealing stays revealed.

use crate::easing::Easing;

/// Visual state of a revealable element
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum RevealState {
    #[default]
    Hidden,
    /// Mid-transition; `progress` is eased and in `0.0..=1.0`
    Revealing { progress: f32 },
    Revealed,
}

/// Inputs to the reveal state machine
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RevealEvent {
    /// The element's reveal time was reached
    Start,
    /// The transition advanced to the given eased progress
    Progress(f32),
    /// The transition completed
    Finish,
}

impl RevealState {
    /// Apply an event. Events that would move backwards are ignored.
    pub fn send(self, event: RevealEvent) -> RevealState {
        match (self, event) {
            (RevealState::Hidden, RevealEvent::Start) => RevealState::Revealing { progress: 0.0 },
            (RevealState::Hidden, RevealEvent::Progress(p))
            | (RevealState::Revealing { .. }, RevealEvent::Progress(p)) => {
                let floor = self.progress();
                let p = if p.is_nan() { floor } else { p.clamp(floor, 1.0) };
                if p >= 1.0 {
                    RevealState::Revealed
                } else {
                    RevealState::Revealing { progress: p }
                }
            }
            (_, RevealEvent::Finish) => RevealState::Revealed,
            (state, _) => state,
        }
    }

    /// State of an element whose reveal begins at `reveal_at` and lasts
    /// `duration` seconds
    pub fn at(now: f64, reveal_at: f64, duration: f64, easing: Easing) -> RevealState {
        if now < reveal_at {
            return RevealState::Hidden;
        }
        let started = RevealState::Hidden.send(RevealEvent::Start);
        if !duration.is_finite() || duration <= 0.0 {
            return started.send(RevealEvent::Finish);
        }
        let linear = ((now - reveal_at) / duration) as f32;
        if linear >= 1.0 {
            started.send(RevealEvent::Finish)
        } else {
            started.send(RevealEvent::Progress(easing.apply(linear)))
        }
    }

    /// Whether the element has started revealing (the boolean the renderer
    /// gets when it does not care about the transition)
    pub fn is_revealed(&self) -> bool {
        !matches!(self, RevealState::Hidden)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, RevealState::Revealed)
    }

    /// Eased progress: 0 while hidden, 1 once revealed
    pub fn progress(&self) -> f32 {
        match self {
            RevealState::Hidden => 0.0,
            RevealState::Revealing { progress } => *progress,
            RevealState::Revealed => 1.0,
        }
    }
}

/// Style values the renderer applies for a reveal ("fade up")
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealStyle {
    pub opacity: f32,
    pub translate_y: f32,
}

impl RevealStyle {
    /// Interpolate from `(0 opacity, offset_y)` to `(1 opacity, 0)`
    pub fn fade_up(state: RevealState, offset_y: f32) -> Self {
        let p = state.progress();
        Self {
            opacity: p,
            translate_y: offset_y * (1.0 - p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_way_transitions() {
        let state = RevealState::Hidden;
        let state = state.send(RevealEvent::Start);
        assert_eq!(state, RevealState::Revealing { progress: 0.0 });

        let state = state.send(RevealEvent::Progress(0.6));
        assert_eq!(state, RevealState::Revealing { progress: 0.6 });

        // Progress never goes backwards
        let state = state.send(RevealEvent::Progress(0.2));
        assert_eq!(state, RevealState::Revealing { progress: 0.6 });

        let state = state.send(RevealEvent::Finish);
        assert_eq!(state, RevealState::Revealed);

        // Revealed is terminal
        assert_eq!(state.send(RevealEvent::Start), RevealState::Revealed);
        assert_eq!(state.send(RevealEvent::Progress(0.0)), RevealState::Revealed);
    }

    #[test]
    fn test_progress_to_one_settles() {
        let state = RevealState::Hidden.send(RevealEvent::Progress(1.0));
        assert_eq!(state, RevealState::Revealed);
    }

    #[test]
    fn test_state_at_time() {
        assert_eq!(RevealState::at(0.9, 1.0, 0.5, Easing::Linear), RevealState::Hidden);
        assert_eq!(
            RevealState::at(1.25, 1.0, 0.5, Easing::Linear),
            RevealState::Revealing { progress: 0.5 }
        );
        assert_eq!(RevealState::at(1.5, 1.0, 0.5, Easing::Linear), RevealState::Revealed);
        assert_eq!(RevealState::at(1.0, 1.0, 0.0, Easing::Linear), RevealState::Revealed);
    }

    #[test]
    fn test_state_at_matches_event_sequence() {
        let easing = Easing::EaseOut;
        let mut stepped = RevealState::Hidden;
        for i in 0..=10 {
            let now = 2.0 + i as f64 * 0.05;
            let linear = (i as f32 * 0.1).min(1.0);
            stepped = if i == 0 {
                stepped.send(RevealEvent::Start)
            } else if i == 10 {
                stepped.send(RevealEvent::Finish)
            } else {
                stepped.send(RevealEvent::Progress(easing.apply(linear)))
            };
            let at = RevealState::at(now, 2.0, 0.5, easing);
            assert!((at.progress() - stepped.progress()).abs() < 1e-4, "frame {}", i);
            assert_eq!(at.is_settled(), stepped.is_settled());
        }
    }

    #[test]
    fn test_fade_up_style() {
        let hidden = RevealStyle::fade_up(RevealState::Hidden, 20.0);
        assert_eq!(hidden, RevealStyle { opacity: 0.0, translate_y: 20.0 });

        let done = RevealStyle::fade_up(RevealState::Revealed, 20.0);
        assert_eq!(done, RevealStyle { opacity: 1.0, translate_y: 0.0 });
    }
}
