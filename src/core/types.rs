//! Pixel-space value types shared by the vision pipeline.
//!
//! - [`Point`]: integer pixel coordinate
//! - [`Segment`]: x-ordered line segment with derived slope
//! - [`LaneSide`]: which lane boundary a segment or line belongs to

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;

/// Integer pixel coordinate (frame or cropped-frame space)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    /// Column
    pub x: i32,
    /// Row (grows downward)
    pub y: i32,
}

impl Point {
    /// Create a new point
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Create a point from floating coordinates, truncating toward zero
    #[inline]
    pub fn from_f64(x: f64, y: f64) -> Self {
        Self::new(x as i32, y as i32)
    }
}

impl Sub for Point {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Line segment with endpoints ordered by x (`p1.x <= p2.x`).
///
/// Ordering is enforced at construction. Slope and midpoint are derived on read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    p1: Point,
    p2: Point,
}

impl Segment {
    /// Create a segment, swapping endpoints if needed so `p1.x <= p2.x`
    pub fn new(a: Point, b: Point) -> Self {
        if a.x <= b.x {
            Self { p1: a, p2: b }
        } else {
            Self { p1: b, p2: a }
        }
    }

    /// Create a segment from raw `(x1, y1, x2, y2)` coordinates
    #[inline]
    pub fn from_coords(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(Point::new(x1, y1), Point::new(x2, y2))
    }

    /// Create a segment from floating coordinates (truncated toward zero)
    #[inline]
    pub fn from_f64(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::new(Point::from_f64(x1, y1), Point::from_f64(x2, y2))
    }

    /// Leftmost endpoint
    #[inline]
    pub fn p1(&self) -> Point {
        self.p1
    }

    /// Rightmost endpoint
    #[inline]
    pub fn p2(&self) -> Point {
        self.p2
    }

    /// Slope `dy/dx`; `0.0` for vertical segments
    #[inline]
    pub fn slope(&self) -> f64 {
        let dx = self.p2.x - self.p1.x;
        if dx == 0 {
            return 0.0;
        }
        f64::from(self.p2.y - self.p1.y) / f64::from(dx)
    }

    /// Horizontal midpoint `(x1 + x2) / 2`, truncated to a pixel
    #[inline]
    pub fn midpoint_x(&self) -> i32 {
        (self.p1.x + self.p2.x) / 2
    }

    /// Whether both endpoints lie at or right of `x`
    #[inline]
    pub fn is_right_of(&self, x: f64) -> bool {
        f64::from(self.p1.x) >= x && f64::from(self.p2.x) >= x
    }

    /// Whether both endpoints lie at or left of `x`
    #[inline]
    pub fn is_left_of(&self, x: f64) -> bool {
        f64::from(self.p1.x) <= x && f64::from(self.p2.x) <= x
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.p1, self.p2)
    }
}

/// Lane boundary side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneSide {
    Left,
    Right,
}

impl fmt::Display for LaneSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LaneSide::Left => write!(f, "left"),
            LaneSide::Right => write!(f, "right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_subtraction() {
        let size = Point::new(1920, 1080) - Point::new(200, 0);
        assert_eq!(size, Point::new(1720, 1080));
    }

    #[test]
    fn test_point_truncates_toward_zero() {
        assert_eq!(Point::from_f64(10.9, -3.7), Point::new(10, -3));
    }

    #[test]
    fn test_segment_normalizes_endpoint_order() {
        let forward = Segment::from_coords(10, 100, 50, 50);
        let reversed = Segment::from_coords(50, 50, 10, 100);
        assert_eq!(forward, reversed);
        assert_eq!(reversed.p1(), Point::new(10, 100));
        assert_eq!(reversed.p2(), Point::new(50, 50));

        for (x1, y1, x2, y2) in [(5, 0, -5, 9), (300, 1, 0, 2), (7, 7, 7, 0)] {
            let s = Segment::from_coords(x1, y1, x2, y2);
            assert!(s.p1().x <= s.p2().x);
        }
    }

    #[test]
    fn test_segment_slope() {
        assert_eq!(Segment::from_coords(0, 0, 10, 20).slope(), 2.0);
        assert_eq!(Segment::from_coords(10, 0, 0, 20).slope(), -2.0);
        // Vertical segments report zero slope
        assert_eq!(Segment::from_coords(4, 0, 4, 100).slope(), 0.0);
    }

    #[test]
    fn test_segment_midpoint_and_sides() {
        let s = Segment::from_coords(200, 50, 240, 100);
        assert_eq!(s.midpoint_x(), 220);
        // Odd sums truncate toward zero
        assert_eq!(Segment::from_coords(10, 100, 51, 50).midpoint_x(), 30);
        assert_eq!(Segment::from_coords(-11, 0, 0, 10).midpoint_x(), -5);
        assert!(s.is_right_of(200.0));
        assert!(!s.is_right_of(201.0));
        assert!(s.is_left_of(240.0));
        assert!(!s.is_left_of(239.5));
    }
}
