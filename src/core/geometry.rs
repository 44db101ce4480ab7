//! Crop rectangle and region-of-interest geometry.
//!
//! Both are computed once from configuration and reused for every frame.

use super::types::{Point, Segment};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Crop rectangle in full-frame coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropBox {
    /// Inclusive top-left corner
    pub top_left: Point,
    /// Exclusive bottom-right corner
    pub bottom_right: Point,
}

impl CropBox {
    /// Create a crop box, rejecting empty or inverted rectangles
    pub fn new(top_left: Point, bottom_right: Point) -> Result<Self> {
        let crop = Self {
            top_left,
            bottom_right,
        };
        crop.validate()?;
        Ok(crop)
    }

    /// Check that the box is non-empty and starts at non-negative coordinates
    pub fn validate(&self) -> Result<()> {
        let size = self.size();
        if self.top_left.x < 0 || self.top_left.y < 0 || size.x <= 0 || size.y <= 0 {
            return Err(Error::Config(format!(
                "crop box {} -> {} is empty or inverted",
                self.top_left, self.bottom_right
            )));
        }
        Ok(())
    }

    /// Cropped-frame size as a vector (width, height)
    #[inline]
    pub fn size(&self) -> Point {
        self.bottom_right - self.top_left
    }

    /// Horizontal center of the cropped frame
    #[inline]
    pub fn center_x(&self) -> f64 {
        f64::from(self.size().x) / 2.0
    }
}

/// Quadrilateral region of interest in cropped-frame coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoiPolygon {
    vertices: [Point; 4],
}

impl RoiPolygon {
    /// Build the polygon from fractional vertex coefficients.
    ///
    /// `fractions` is `[x1, y1, x2, y2, x3, y3, x4, y4]`, each in `[0, 1]`;
    /// vertex `i` is `(xi * width, yi * height)` truncated to pixels.
    pub fn from_fractions(size: Point, fractions: &[f64; 8]) -> Result<Self> {
        if let Some(bad) = fractions.iter().find(|f| !(0.0..=1.0).contains(*f)) {
            return Err(Error::Config(format!("ROI fraction {} outside [0, 1]", bad)));
        }

        let width = f64::from(size.x);
        let height = f64::from(size.y);
        let vertex =
            |i: usize| Point::from_f64(fractions[2 * i] * width, fractions[2 * i + 1] * height);

        Ok(Self {
            vertices: [vertex(0), vertex(1), vertex(2), vertex(3)],
        })
    }

    /// Polygon vertices in order
    #[inline]
    pub fn vertices(&self) -> &[Point; 4] {
        &self.vertices
    }

    /// Inclusive point-in-polygon test (points on an edge are inside)
    pub fn contains(&self, p: Point) -> bool {
        let n = self.vertices.len();
        let mut inside = false;

        for i in 0..n {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % n];

            if on_edge(a, b, p) {
                return true;
            }

            // Even-odd ray cast toward +x
            if (a.y > p.y) != (b.y > p.y) {
                let t = f64::from(p.y - a.y) / f64::from(b.y - a.y);
                let x_cross = f64::from(a.x) + t * f64::from(b.x - a.x);
                if f64::from(p.x) < x_cross {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// Whether both endpoints of a segment lie inside the polygon
    #[inline]
    pub fn contains_segment(&self, segment: &Segment) -> bool {
        self.contains(segment.p1()) && self.contains(segment.p2())
    }
}

fn on_edge(a: Point, b: Point, p: Point) -> bool {
    let cross = i64::from(b.x - a.x) * i64::from(p.y - a.y)
        - i64::from(b.y - a.y) * i64::from(p.x - a.x);
    cross == 0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_crop() -> CropBox {
        CropBox::new(Point::new(200, 0), Point::new(1920, 1080)).unwrap()
    }

    #[test]
    fn test_crop_size_and_center() {
        let crop = default_crop();
        assert_eq!(crop.size(), Point::new(1720, 1080));
        assert_eq!(crop.center_x(), 860.0);
    }

    #[test]
    fn test_inverted_crop_rejected() {
        assert!(CropBox::new(Point::new(100, 100), Point::new(50, 200)).is_err());
        assert!(CropBox::new(Point::new(0, 0), Point::new(0, 10)).is_err());
    }

    #[test]
    fn test_roi_from_fractions() {
        let roi = RoiPolygon::from_fractions(
            Point::new(1000, 500),
            &[0.2, 0.95, 0.45, 0.6, 0.55, 0.6, 0.8, 0.95],
        )
        .unwrap();
        assert_eq!(
            roi.vertices(),
            &[
                Point::new(200, 475),
                Point::new(450, 300),
                Point::new(550, 300),
                Point::new(800, 475),
            ]
        );
    }

    #[test]
    fn test_roi_rejects_out_of_range_fraction() {
        let result = RoiPolygon::from_fractions(
            Point::new(100, 100),
            &[0.2, 0.95, 1.2, 0.6, 0.55, 0.6, 0.8, 0.95],
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_roi_vertices_within_bounds() {
        let size = Point::new(1720, 1080);
        let roi =
            RoiPolygon::from_fractions(size, &[0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0]).unwrap();
        for v in roi.vertices() {
            assert!(v.x >= 0 && v.x <= size.x);
            assert!(v.y >= 0 && v.y <= size.y);
        }
    }

    #[test]
    fn test_roi_contains() {
        let roi = RoiPolygon::from_fractions(
            Point::new(1000, 500),
            &[0.2, 0.95, 0.45, 0.6, 0.55, 0.6, 0.8, 0.95],
        )
        .unwrap();

        assert!(roi.contains(Point::new(500, 400)));
        // Vertex and edge points count as inside
        assert!(roi.contains(Point::new(200, 475)));
        assert!(roi.contains(Point::new(500, 300)));
        // Above the trapezoid and outside its slanted sides
        assert!(!roi.contains(Point::new(500, 100)));
        assert!(!roi.contains(Point::new(210, 310)));
        assert!(!roi.contains(Point::new(900, 470)));

        assert!(roi.contains_segment(&Segment::from_coords(300, 450, 440, 320)));
        assert!(!roi.contains_segment(&Segment::from_coords(300, 450, 300, 100)));
    }
}
