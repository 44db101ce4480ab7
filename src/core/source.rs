//! Collaborator traits for frame capture and segment extraction

use super::frame::{Frame, FrameView};
use super::geometry::RoiPolygon;
use super::types::Segment;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Probabilistic Hough transform parameters handed to the extractor
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HoughParams {
    /// Distance resolution in pixels
    pub rho: f64,
    /// Angle resolution in radians
    pub theta: f64,
    /// Minimum accumulator votes
    pub threshold: u32,
    /// Minimum segment length in pixels
    pub min_line_length: f64,
    /// Maximum gap bridged between collinear pieces, in pixels
    pub max_line_gap: f64,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            rho: 2.0,
            theta: std::f64::consts::PI / 180.0,
            threshold: 15,
            min_line_length: 40.0,
            max_line_gap: 25.0,
        }
    }
}

/// Frame source trait (screen grabber, camera, replay)
pub trait FrameSource {
    /// Capture the next frame; `Ok(None)` means the stream has ended
    fn capture(&mut self) -> Result<Option<Frame>>;
}

/// Line segment extractor trait (edge detection + Hough transform)
pub trait SegmentExtractor {
    /// Extract raw segments from a cropped frame.
    ///
    /// Implementations must restrict detection to `roi` and return
    /// coordinates in cropped-frame space. An empty vector means no
    /// segment passed the threshold.
    fn extract(
        &mut self,
        view: &FrameView<'_>,
        roi: &RoiPolygon,
        params: &HoughParams,
    ) -> Result<Vec<Segment>>;
}
