//! Lane-center offset (delta) from smoothed lane lines

use crate::core::types::Segment;

/// Empirical delta used when only one lane line is visible (pixels)
pub const DEFAULT_SINGLE_LINE_OFFSET: f64 = 100.0;

/// Converts smoothed left/right lines into a signed pixel delta.
///
/// `delta = frame_center - lane_center`: positive when the frame center is
/// right of the lane center, which raises steering. The lane center is the
/// truncated mean of the two truncated line midpoints.
/// `None` is the explicit "no signal" state and is never folded into zero here.
#[derive(Debug, Clone, Copy)]
pub struct OffsetCalculator {
    single_line_offset: f64,
}

impl OffsetCalculator {
    pub fn new(single_line_offset: f64) -> Self {
        Self { single_line_offset }
    }

    /// Compute the delta for one frame
    pub fn delta(
        &self,
        left: Option<&Segment>,
        right: Option<&Segment>,
        frame_center: f64,
    ) -> Option<f64> {
        match (left, right) {
            (Some(left), Some(right)) => {
                let guessed_center = (left.midpoint_x() + right.midpoint_x()) / 2;
                Some(frame_center - f64::from(guessed_center))
            }
            // Drifted onto the left marking
            (Some(_), None) => Some(-self.single_line_offset),
            (None, Some(_)) => Some(self.single_line_offset),
            (None, None) => None,
        }
    }
}

impl Default for OffsetCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_SINGLE_LINE_OFFSET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_lines() {
        let left = Segment::from_coords(10, 100, 50, 50);
        let right = Segment::from_coords(200, 50, 240, 100);
        let delta = OffsetCalculator::default().delta(Some(&left), Some(&right), 150.0);
        assert_eq!(delta, Some(25.0));
    }

    #[test]
    fn test_lane_center_truncated_to_pixels() {
        // Left midpoint 30.5 -> 30, lane center (30 + 220) / 2 = 125
        let left = Segment::from_coords(10, 100, 51, 50);
        let right = Segment::from_coords(200, 50, 240, 100);
        let delta = OffsetCalculator::default().delta(Some(&left), Some(&right), 150.0);
        assert_eq!(delta, Some(25.0));

        // Odd sum of midpoints: (30 + 221) / 2 = 125
        let right = Segment::from_coords(200, 50, 242, 100);
        let delta = OffsetCalculator::default().delta(Some(&left), Some(&right), 150.5);
        assert_eq!(delta, Some(25.5));
    }

    #[test]
    fn test_single_line_fallback() {
        let line = Segment::from_coords(10, 100, 50, 50);
        let calc = OffsetCalculator::default();
        assert_eq!(calc.delta(Some(&line), None, 150.0), Some(-100.0));
        assert_eq!(calc.delta(None, Some(&line), 150.0), Some(100.0));

        let custom = OffsetCalculator::new(42.0);
        assert_eq!(custom.delta(Some(&line), None, 150.0), Some(-42.0));
    }

    #[test]
    fn test_no_signal_distinct_from_zero() {
        assert_eq!(OffsetCalculator::default().delta(None, None, 150.0), None);

        let left = Segment::from_coords(100, 100, 120, 50);
        let right = Segment::from_coords(180, 50, 200, 100);
        // Lane centered exactly on the frame
        assert_eq!(
            OffsetCalculator::default().delta(Some(&left), Some(&right), 150.0),
            Some(0.0)
        );
    }
}
