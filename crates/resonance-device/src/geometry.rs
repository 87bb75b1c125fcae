//! Screen geometry in the fixed 1920x1080 reference resolution

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference screen width
pub const SCREEN_WIDTH: i32 = 1920;

/// Reference screen height
pub const SCREEN_HEIGHT: i32 = 1080;

/// Integer screen coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by another point (local crop coordinates to screen coordinates)
    #[inline]
    #[must_use]
    pub const fn offset(self, by: Point) -> Self {
        Self {
            x: self.x + by.x,
            y: self.y + by.y,
        }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Screen region `(x1, y1, x2, y2)`, right and bottom edges exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Rect {
    #[inline]
    #[must_use]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::new(self.x1, self.y1)
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    #[must_use]
    pub const fn contains(&self, point: Point) -> bool {
        point.x >= self.x1 && point.x < self.x2 && point.y >= self.y1 && point.y < self.y2
    }

    /// Clamp to a `width` x `height` image; `None` if nothing remains
    #[must_use]
    pub fn clamp_to(&self, width: i32, height: i32) -> Option<Rect> {
        let clamped = Rect::new(
            self.x1.clamp(0, width),
            self.y1.clamp(0, height),
            self.x2.clamp(0, width),
            self.y2.clamp(0, height),
        );
        (!clamped.is_empty()).then_some(clamped)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}, {}, {}]", self.x1, self.y1, self.x2, self.y2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_translates_crop_local_points() {
        let region = Rect::new(978, 227, 1263, 1025);
        assert_eq!(Point::new(10, 20).offset(region.origin()), Point::new(988, 247));
    }

    #[test]
    fn clamp_drops_regions_outside_image() {
        let r = Rect::new(1900, 1000, 2000, 1100);
        assert_eq!(r.clamp_to(1920, 1080), Some(Rect::new(1900, 1000, 1920, 1080)));
        assert_eq!(Rect::new(2000, 0, 2100, 10).clamp_to(1920, 1080), None);
    }

    #[test]
    fn contains_excludes_far_edges() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(Point::new(0, 0)));
        assert!(!r.contains(Point::new(10, 5)));
    }
}
