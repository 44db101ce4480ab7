//! Core pixel-space types and collaborator abstractions.
//!
//! - [`types`]: points, segments, lane sides
//! - [`geometry`]: crop box and region of interest
//! - [`frame`]: raster frames and crop views
//! - [`source`]: traits to implement for capture and segment extraction

pub mod frame;
pub mod geometry;
pub mod source;
pub mod types;

pub use frame::{Frame, FrameView};
pub use geometry::{CropBox, RoiPolygon};
pub use source::{FrameSource, HoughParams, SegmentExtractor};
pub use types::{LaneSide, Point, Segment};
