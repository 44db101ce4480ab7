//! Lane estimation: classification, temporal smoothing, offset and steering.
//!
//! The [`LaneSeeker`] runs the per-frame chain; the [`SteeringSmoother`]
//! turns its deltas into a steering value for the vehicle link.

pub mod classifier;
pub mod estimator;
pub mod offset;
pub mod seeker;
pub mod steering;

pub use classifier::{Classified, SegmentClassifier};
pub use estimator::{LaneWindow, LineEstimator};
pub use offset::OffsetCalculator;
pub use seeker::{LaneEstimate, LaneSeeker};
pub use steering::SteeringSmoother;
