//! Left/right lane candidate selection from raw segments.
//!
//! Hard classification: a segment is either a left candidate, a right
//! candidate, or dropped. Nothing is scored.
//!
//! ```text
//!            center
//!              │
//!   ╲          │          ╱
//!    ╲ left    │   right ╱      image y grows downward, so the left
//!     ╲ slope<0│slope>0 ╱       marking rises toward the center (slope < 0)
//! ```

use crate::core::types::Segment;

/// Slope magnitude at or below which a segment is treated as horizontal noise
pub const DEFAULT_MIN_ABS_SLOPE: f64 = 0.55;

/// Candidate segments for one frame, split by side
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classified {
    pub left: Vec<Segment>,
    pub right: Vec<Segment>,
}

/// Splits raw segments into left and right lane candidates
#[derive(Debug, Clone, Copy)]
pub struct SegmentClassifier {
    center: f64,
    min_abs_slope: f64,
}

impl SegmentClassifier {
    /// Create a classifier for a cropped frame whose horizontal center is `center`
    pub fn new(center: f64, min_abs_slope: f64) -> Self {
        Self {
            center,
            min_abs_slope,
        }
    }

    /// Horizontal center used as the left/right boundary
    #[inline]
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Classify every segment of a frame
    pub fn classify(&self, segments: &[Segment]) -> Classified {
        let mut out = Classified::default();

        for segment in segments {
            let slope = segment.slope();
            if slope.abs() <= self.min_abs_slope {
                continue;
            }

            if slope > 0.0 {
                if segment.is_right_of(self.center) {
                    out.right.push(*segment);
                }
            } else if segment.is_left_of(self.center) {
                out.left.push(*segment);
            }
        }

        log::trace!(
            "Classified {} segments: {} left, {} right",
            segments.len(),
            out.left.len(),
            out.right.len()
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> SegmentClassifier {
        SegmentClassifier::new(150.0, DEFAULT_MIN_ABS_SLOPE)
    }

    #[test]
    fn test_near_horizontal_dropped() {
        // |slope| = 0.5 and exactly 0.55 are both rejected
        let segments = [
            Segment::from_coords(10, 100, 110, 50),
            Segment::from_coords(200, 0, 300, 55),
        ];
        assert_eq!(classifier().classify(&segments), Classified::default());
    }

    #[test]
    fn test_sides_by_slope_and_position() {
        let left = Segment::from_coords(10, 100, 50, 50);
        let right = Segment::from_coords(200, 50, 240, 100);
        let result = classifier().classify(&[left, right]);
        assert_eq!(result.left, vec![left]);
        assert_eq!(result.right, vec![right]);
    }

    #[test]
    fn test_cross_center_segments_dropped() {
        // Positive slope but starts left of center
        let straddling_right = Segment::from_coords(140, 50, 180, 100);
        // Negative slope but ends right of center
        let straddling_left = Segment::from_coords(120, 100, 160, 50);
        // Positive slope entirely on the left half
        let wrong_half = Segment::from_coords(10, 10, 40, 60);
        let result = classifier().classify(&[straddling_right, straddling_left, wrong_half]);
        assert!(result.left.is_empty());
        assert!(result.right.is_empty());
    }

    #[test]
    fn test_endpoint_on_center_accepted() {
        let left = Segment::from_coords(110, 100, 150, 40);
        let right = Segment::from_coords(150, 40, 190, 100);
        let result = classifier().classify(&[left, right]);
        assert_eq!(result.left.len(), 1);
        assert_eq!(result.right.len(), 1);
    }

    #[test]
    fn test_vertical_segment_dropped() {
        // Vertical segments have slope 0 by convention
        let result = classifier().classify(&[Segment::from_coords(20, 0, 20, 100)]);
        assert!(result.left.is_empty() && result.right.is_empty());
    }
}
