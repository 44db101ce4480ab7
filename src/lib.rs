//! Lane Autopilot - lane keeping for a driving simulator
//!
//! Turns line segments detected in captured frames into a steering value
//! and drives a simulated vehicle over a UDP link.
//!
//! ## Modules
//!
//! - [`core`]: pixel-space geometry, frames and collaborator traits
//! - [`lane`]: segment classification, lane smoothing, offset and steering
//! - [`link`]: pairing, telemetry receive loop and command send loop
//! - [`replay`]: recorded segment playback for running without a capture stack

pub mod config;
pub mod core;
pub mod error;
pub mod lane;
pub mod link;
pub mod replay;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use lane::{LaneEstimate, LaneSeeker, SteeringSmoother};
pub use link::{LinkState, VehicleLink};
