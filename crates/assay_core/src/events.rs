//! Input events
//!
//! Everything the host feeds into the motion core between frames.

use crate::clock::FrameTick;
use crate::visibility::ElementId;

/// Event type identifier
pub type EventType = u32;

/// Event type constants, mirroring [`FrameEvent`] variants
pub mod event_types {
    use super::EventType;

    pub const TICK: EventType = 1;
    pub const VISIBILITY: EventType = 2;
    pub const POINTER_MOVE: EventType = 3;
    pub const POINTER_LEAVE: EventType = 4;
    pub const UNMOUNT: EventType = 5;
}

/// A raw pointer position, local to the element it targets
///
/// Convert client coordinates with [`Rect::to_local`](crate::geometry::Rect::to_local).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
}

impl PointerSample {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both coordinates are usable numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// An event delivered to the motion core
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameEvent {
    /// The frame loop fired
    Tick(FrameTick),
    /// An element's viewport visibility changed
    Visibility { target: ElementId, visible: bool },
    /// The pointer moved over an element (coordinates are element-local)
    PointerMove { target: ElementId, pointer: PointerSample },
    /// The pointer left an element
    PointerLeave { target: ElementId },
    /// An element was torn down
    Unmount { target: ElementId },
}

impl FrameEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            FrameEvent::Tick(_) => event_types::TICK,
            FrameEvent::Visibility { .. } => event_types::VISIBILITY,
            FrameEvent::PointerMove { .. } => event_types::POINTER_MOVE,
            FrameEvent::PointerLeave { .. } => event_types::POINTER_LEAVE,
            FrameEvent::Unmount { .. } => event_types::UNMOUNT,
        }
    }

    /// Element the event is addressed to (`None` for frame ticks)
    pub fn target(&self) -> Option<ElementId> {
        match *self {
            FrameEvent::Tick(_) => None,
            FrameEvent::Visibility { target, .. }
            | FrameEvent::PointerMove { target, .. }
            | FrameEvent::PointerLeave { target }
            | FrameEvent::Unmount { target } => Some(target),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_targets() {
        assert_eq!(FrameEvent::Tick(FrameTick::at(0.0)).target(), None);
        assert_eq!(FrameEvent::Unmount { target: 3 }.target(), Some(3));
        assert_eq!(
            FrameEvent::PointerMove {
                target: 9,
                pointer: PointerSample::new(1.0, 2.0),
            }
            .event_type(),
            event_types::POINTER_MOVE
        );
    }

    #[test]
    fn test_event_types_are_sequential() {
        let events = [
            FrameEvent::Tick(FrameTick::at(0.0)),
            FrameEvent::Visibility { target: 1, visible: true },
            FrameEvent::PointerMove { target: 1, pointer: PointerSample::default() },
            FrameEvent::PointerLeave { target: 1 },
            FrameEvent::Unmount { target: 1 },
        ];
        let types: Vec<EventType> = events.iter().map(FrameEvent::event_type).collect();
        assert_eq!(types, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_pointer_finite() {
        assert!(PointerSample::new(1.0, 2.0).is_finite());
        assert!(!PointerSample::new(f32::NAN, 2.0).is_finite());
    }
}
