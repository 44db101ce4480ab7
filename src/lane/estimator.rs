//! Temporal lane line estimation.
//!
//! Each side keeps a [`LaneWindow`] of per-frame representative segments.
//! A frame's candidates are reduced to one representative by a two-cluster
//! mean split, pushed into the window, and the smoothed line is the
//! component-wise mean of the window.
//!
//! # Representative segment
//!
//! Endpoint coordinates are pooled into `xs` / `ys` and split around their
//! means (values equal to the mean belong to neither cluster):
//!
//! ```text
//! left:  (mean(xs_gt), mean(ys_lt)) -> (mean(xs_lt), mean(ys_gt))
//! right: (mean(xs_lt), mean(ys_lt)) -> (mean(xs_gt), mean(ys_gt))
//! ```
//!
//! A left marking's top end is up and to the right of its bottom end in
//! image space; the right marking mirrors that.
//!
//! # Degenerate input
//!
//! If a cluster is empty (e.g. all candidate x values are equal) the frame
//! produces no representative and the previous smoothed line is kept.

use crate::core::types::{LaneSide, Segment};
use std::collections::VecDeque;

/// Default number of frames averaged per side
pub const DEFAULT_LANE_WINDOW: usize = 5;

/// Bounded FIFO of representative segments (oldest evicted first)
#[derive(Debug, Clone)]
pub struct LaneWindow {
    segments: VecDeque<Segment>,
    capacity: usize,
}

impl LaneWindow {
    /// Create an empty window holding at most `capacity` segments (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            segments: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a segment, evicting the oldest when full
    pub fn push(&mut self, segment: Segment) {
        if self.segments.len() == self.capacity {
            self.segments.pop_front();
        }
        self.segments.push_back(segment);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Segments from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter()
    }

    /// Component-wise mean of all segments, `None` when empty
    pub fn average(&self) -> Option<Segment> {
        if self.segments.is_empty() {
            return None;
        }
        let n = self.segments.len() as f64;
        let (mut x1, mut y1, mut x2, mut y2) = (0.0, 0.0, 0.0, 0.0);
        for s in &self.segments {
            x1 += f64::from(s.p1().x);
            y1 += f64::from(s.p1().y);
            x2 += f64::from(s.p2().x);
            y2 += f64::from(s.p2().y);
        }
        Some(Segment::from_f64(x1 / n, y1 / n, x2 / n, y2 / n))
    }

    pub fn clear(&mut self) {
        self.segments.clear();
    }
}

/// Smoothed lane line tracker for one side
#[derive(Debug, Clone)]
pub struct LineEstimator {
    side: LaneSide,
    window: LaneWindow,
}

impl LineEstimator {
    /// Create an estimator for `side` averaging over `window_size` frames
    pub fn new(side: LaneSide, window_size: usize) -> Self {
        Self {
            side,
            window: LaneWindow::new(window_size),
        }
    }

    #[inline]
    pub fn side(&self) -> LaneSide {
        self.side
    }

    /// Window contents (for inspection and tests)
    #[inline]
    pub fn window(&self) -> &LaneWindow {
        &self.window
    }

    /// Current smoothed line without updating
    #[inline]
    pub fn smoothed(&self) -> Option<Segment> {
        self.window.average()
    }

    /// Feed one frame's candidates and return the smoothed line.
    ///
    /// Empty or degenerate candidate sets leave the window untouched; the
    /// returned line is then the previous smoothed line (or `None` if no
    /// frame has produced one yet).
    pub fn update(&mut self, candidates: &[Segment]) -> Option<Segment> {
        if !candidates.is_empty() {
            match representative(self.side, candidates) {
                Some(segment) => self.window.push(segment),
                None => log::debug!(
                    "Degenerate {} candidates ({} segments), keeping previous line",
                    self.side,
                    candidates.len()
                ),
            }
        }
        self.window.average()
    }

    /// Drop all history
    pub fn reset(&mut self) {
        self.window.clear();
    }
}

/// Reduce one frame's candidates to a single representative segment
pub fn representative(side: LaneSide, candidates: &[Segment]) -> Option<Segment> {
    let xs: Vec<f64> = candidates
        .iter()
        .flat_map(|s| [s.p1().x, s.p2().x])
        .map(f64::from)
        .collect();
    let ys: Vec<f64> = candidates
        .iter()
        .flat_map(|s| [s.p1().y, s.p2().y])
        .map(f64::from)
        .collect();

    let (xs_lt, xs_gt) = split_around_mean(&xs)?;
    let (ys_lt, ys_gt) = split_around_mean(&ys)?;

    let segment = match side {
        LaneSide::Left => Segment::from_f64(xs_gt, ys_lt, xs_lt, ys_gt),
        LaneSide::Right => Segment::from_f64(xs_lt, ys_lt, xs_gt, ys_gt),
    };
    Some(segment)
}

/// Means of the values strictly below and strictly above the overall mean
fn split_around_mean(values: &[f64]) -> Option<(f64, f64)> {
    let m = mean(values.iter().copied())?;
    let below = mean(values.iter().copied().filter(|v| *v < m))?;
    let above = mean(values.iter().copied().filter(|v| *v > m))?;
    Some((below, above))
}

/// Arithmetic mean, `None` for an empty sequence
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bounded_and_ordered() {
        let mut window = LaneWindow::new(5);
        let pushed: Vec<Segment> = (0..12).map(|i| Segment::from_coords(i, 0, i + 1, 10)).collect();

        for (k, s) in pushed.iter().enumerate() {
            window.push(*s);
            assert!(window.len() <= 5);
            assert_eq!(window.len(), (k + 1).min(5));
        }

        let kept: Vec<Segment> = window.iter().copied().collect();
        assert_eq!(kept, pushed[7..].to_vec());
    }

    #[test]
    fn test_window_average_componentwise() {
        let mut window = LaneWindow::new(3);
        assert_eq!(window.average(), None);
        window.push(Segment::from_coords(0, 100, 10, 0));
        window.push(Segment::from_coords(4, 90, 20, 10));
        // (2, 95) -> (15, 5)
        assert_eq!(window.average(), Some(Segment::from_coords(2, 95, 15, 5)));
    }

    #[test]
    fn test_left_representative() {
        let candidates = [
            Segment::from_coords(10, 100, 50, 50),
            Segment::from_coords(20, 90, 60, 40),
        ];
        // xs = [10, 50, 20, 60] mean 35 -> lt 15, gt 55
        // ys = [100, 50, 90, 40] mean 70 -> lt 45, gt 95
        let line = representative(LaneSide::Left, &candidates).unwrap();
        assert_eq!(line, Segment::from_coords(15, 95, 55, 45));
    }

    #[test]
    fn test_right_representative() {
        let candidates = [
            Segment::from_coords(200, 50, 240, 100),
            Segment::from_coords(210, 40, 250, 90),
        ];
        // xs mean 225 -> lt 205, gt 245; ys mean 70 -> lt 45, gt 95
        let line = representative(LaneSide::Right, &candidates).unwrap();
        assert_eq!(line, Segment::from_coords(205, 45, 245, 95));
    }

    #[test]
    fn test_degenerate_candidates_keep_previous_line() {
        let mut estimator = LineEstimator::new(LaneSide::Left, 5);
        let first = estimator.update(&[Segment::from_coords(10, 100, 50, 50)]);
        assert_eq!(first, Some(Segment::from_coords(10, 100, 50, 50)));

        // All x values equal: both partitions empty
        let vertical = [Segment::from_coords(30, 0, 30, 80)];
        assert_eq!(representative(LaneSide::Left, &vertical), None);
        assert_eq!(estimator.update(&vertical), first);
        assert_eq!(estimator.window().len(), 1);
    }

    #[test]
    fn test_empty_candidates() {
        let mut estimator = LineEstimator::new(LaneSide::Right, 5);
        assert_eq!(estimator.update(&[]), None);

        let line = estimator.update(&[Segment::from_coords(200, 50, 240, 100)]);
        assert!(line.is_some());
        assert_eq!(estimator.update(&[]), line);
        assert_eq!(estimator.window().len(), 1);
    }

    #[test]
    fn test_smoothing_over_frames() {
        let mut estimator = LineEstimator::new(LaneSide::Right, 2);
        estimator.update(&[Segment::from_coords(200, 50, 240, 100)]);
        estimator.update(&[Segment::from_coords(210, 50, 250, 100)]);
        assert_eq!(estimator.smoothed(), Some(Segment::from_coords(205, 50, 245, 100)));

        // Oldest frame drops out of the window
        estimator.update(&[Segment::from_coords(230, 50, 270, 100)]);
        assert_eq!(estimator.smoothed(), Some(Segment::from_coords(220, 50, 260, 100)));
    }
}
