//! Low-pass steering from recent deltas.
//!
//! `steering = 0.5 + mean(last N deltas) / scale`, saturated to `[0, 1]`.
//! Frames without a lane signal contribute an explicit `0` so the wheel
//! drifts back toward center instead of holding the last correction.

use std::collections::VecDeque;

/// Default number of deltas averaged
pub const DEFAULT_STEERING_WINDOW: usize = 5;

/// Default pixels-per-full-lock scale
pub const DEFAULT_STEERING_SCALE: f64 = 600.0;

/// Centered steering value
pub const STEERING_CENTER: f64 = 0.5;

/// Moving-average steering filter
#[derive(Debug, Clone)]
pub struct SteeringSmoother {
    deltas: VecDeque<f64>,
    capacity: usize,
    scale: f64,
}

impl SteeringSmoother {
    /// Create a smoother averaging `window` deltas (minimum 1)
    pub fn new(window: usize, scale: f64) -> Self {
        let capacity = window.max(1);
        Self {
            deltas: VecDeque::with_capacity(capacity),
            capacity,
            scale,
        }
    }

    /// Record one frame's delta (`None` = no signal) and return the new steering value
    pub fn push(&mut self, delta: Option<f64>) -> f64 {
        if self.deltas.len() == self.capacity {
            self.deltas.pop_front();
        }
        self.deltas.push_back(delta.unwrap_or(0.0));
        self.steering()
    }

    /// Mean of the recorded deltas (`0` when empty)
    pub fn mean_delta(&self) -> f64 {
        if self.deltas.is_empty() {
            return 0.0;
        }
        self.deltas.iter().sum::<f64>() / self.deltas.len() as f64
    }

    /// Current steering value in `[0, 1]`
    pub fn steering(&self) -> f64 {
        let raw = STEERING_CENTER + self.mean_delta() / self.scale;
        let clamped = raw.clamp(0.0, 1.0);
        if clamped != raw {
            log::debug!("Steering {:.3} saturated to {:.1}", raw, clamped);
        }
        clamped
    }

    /// Number of recorded deltas
    #[inline]
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }
}

impl Default for SteeringSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_STEERING_WINDOW, DEFAULT_STEERING_SCALE)
    }
}
