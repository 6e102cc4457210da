//! Rectangles in client (viewport) coordinates

/// An axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Grow (or shrink, for negative values) every edge by `margin`
    pub fn expand(&self, margin: f32) -> Rect {
        Rect {
            x: self.x - margin,
            y: self.y - margin,
            width: (self.width + 2.0 * margin).max(0.0),
            height: (self.height + 2.0 * margin).max(0.0),
        }
    }

    /// Inclusive point containment
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Overlapping region, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Fraction of this rectangle's area that lies inside `viewport`
    ///
    /// Degenerate (zero-area) rectangles report 1.0 when their origin is
    /// inside the viewport and 0.0 otherwise.
    pub fn intersection_ratio(&self, viewport: &Rect) -> f32 {
        let area = self.area();
        if area <= 0.0 {
            return if viewport.contains(self.x, self.y) {
                1.0
            } else {
                0.0
            };
        }
        match self.intersection(viewport) {
            Some(overlap) => (overlap.area() / area).clamp(0.0, 1.0),
            None => 0.0,
        }
    }

    /// Convert a client-space point into coordinates relative to this rect
    pub fn to_local(&self, x: f32, y: f32) -> (f32, f32) {
        (x - self.x, y - self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_ratio() {
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);

        assert_eq!(Rect::new(10.0, 10.0, 20.0, 20.0).intersection_ratio(&viewport), 1.0);
        assert_eq!(Rect::new(90.0, 0.0, 20.0, 10.0).intersection_ratio(&viewport), 0.5);
        assert_eq!(Rect::new(200.0, 0.0, 20.0, 10.0).intersection_ratio(&viewport), 0.0);
    }

    #[test]
    fn test_zero_area_rect() {
        let viewport = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(Rect::new(50.0, 50.0, 0.0, 0.0).intersection_ratio(&viewport), 1.0);
        assert_eq!(Rect::new(150.0, 50.0, 0.0, 0.0).intersection_ratio(&viewport), 0.0);
    }

    #[test]
    fn test_expand_and_local() {
        let card = Rect::new(10.0, 20.0, 100.0, 50.0);
        let grown = card.expand(5.0);
        assert_eq!(grown, Rect::new(5.0, 15.0, 110.0, 60.0));
        assert_eq!(card.to_local(15.0, 30.0), (5.0, 10.0));
    }
}
