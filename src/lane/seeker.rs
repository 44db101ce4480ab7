//! Per-frame lane seeking pipeline.
//!
//! ```text
//! frame ─crop─▶ extractor ─▶ classifier ─┬─▶ left estimator ──┐
//!                                        └─▶ right estimator ─┴─▶ offset ─▶ delta
//! ```
//!
//! Frames must be fed in capture order; the estimators' windows are
//! order-sensitive.

use super::classifier::SegmentClassifier;
use super::estimator::LineEstimator;
use super::offset::OffsetCalculator;
use crate::config::{EstimatorConfig, VisionConfig};
use crate::core::frame::Frame;
use crate::core::geometry::{CropBox, RoiPolygon};
use crate::core::source::{HoughParams, SegmentExtractor};
use crate::core::types::{LaneSide, Segment};
use crate::error::Result;

/// Result of processing one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LaneEstimate {
    /// Smoothed left lane line, if any has been seen
    pub left: Option<Segment>,
    /// Smoothed right lane line, if any has been seen
    pub right: Option<Segment>,
    /// Signed lane-center offset in pixels; `None` = no signal
    pub delta: Option<f64>,
    /// Left candidates accepted this frame
    pub left_candidates: usize,
    /// Right candidates accepted this frame
    pub right_candidates: usize,
}

/// Lane seeker: geometry, classification, temporal smoothing and offset
pub struct LaneSeeker {
    crop: CropBox,
    roi: RoiPolygon,
    hough: HoughParams,
    classifier: SegmentClassifier,
    left: LineEstimator,
    right: LineEstimator,
    offset: OffsetCalculator,
}

impl LaneSeeker {
    /// Create a seeker; the ROI polygon is computed once here
    pub fn new(vision: &VisionConfig, estimator: &EstimatorConfig) -> Result<Self> {
        vision.crop.validate()?;
        let roi = RoiPolygon::from_fractions(vision.crop.size(), &vision.roi)?;
        let center = vision.crop.center_x();

        log::debug!(
            "Lane seeker: crop {} -> {}, ROI {:?}, center x={}",
            vision.crop.top_left,
            vision.crop.bottom_right,
            roi.vertices(),
            center
        );

        Ok(Self {
            crop: vision.crop,
            roi,
            hough: vision.hough,
            classifier: SegmentClassifier::new(center, estimator.min_abs_slope),
            left: LineEstimator::new(LaneSide::Left, estimator.lane_window),
            right: LineEstimator::new(LaneSide::Right, estimator.lane_window),
            offset: OffsetCalculator::new(estimator.single_line_offset),
        })
    }

    #[inline]
    pub fn roi(&self) -> &RoiPolygon {
        &self.roi
    }

    #[inline]
    pub fn crop(&self) -> &CropBox {
        &self.crop
    }

    /// Horizontal center of the cropped frame
    #[inline]
    pub fn frame_center(&self) -> f64 {
        self.classifier.center()
    }

    /// Crop a full frame, extract its segments and process them
    pub fn process_frame<E>(&mut self, frame: &Frame, extractor: &mut E) -> Result<LaneEstimate>
    where
        E: SegmentExtractor + ?Sized,
    {
        let view = frame.crop(&self.crop)?;
        let segments = extractor.extract(&view, &self.roi, &self.hough)?;
        Ok(self.process_segments(&segments))
    }

    /// Process raw segments already in cropped-frame coordinates
    pub fn process_segments(&mut self, segments: &[Segment]) -> LaneEstimate {
        let classified = self.classifier.classify(segments);
        let left = self.left.update(&classified.left);
        let right = self.right.update(&classified.right);
        let delta = self
            .offset
            .delta(left.as_ref(), right.as_ref(), self.frame_center());

        log::trace!(
            "Frame: {} raw, left={:?}, right={:?}, delta={:?}",
            segments.len(),
            left,
            right,
            delta
        );

        LaneEstimate {
            left,
            right,
            delta,
            left_candidates: classified.left.len(),
            right_candidates: classified.right.len(),
        }
    }

    /// Forget all lane history
    pub fn reset(&mut self) {
        self.left.reset();
        self.right.reset();
    }
}
