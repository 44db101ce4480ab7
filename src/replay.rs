//! Recorded segment replay
//!
//! Drives the pipeline without a screen grabber or an edge detector. Each
//! line of the replay file holds the raw segments extracted from one frame:
//!
//! ```text
//! {"segments": [[10, 100, 50, 50], [200, 50, 240, 100]]}
//! {"segments": []}
//! ```
//!
//! Coordinates are in cropped-frame pixels. Blank lines are ignored.

use crate::core::frame::{Frame, FrameView};
use crate::core::geometry::{CropBox, RoiPolygon};
use crate::core::source::{FrameSource, HoughParams, SegmentExtractor};
use crate::core::types::Segment;
use crate::error::Result;
use serde::Deserialize;
use std::collections::VecDeque;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ReplayRecord {
    segments: Vec<[i32; 4]>,
}

/// Replays recorded segments frame by frame.
///
/// As a [`FrameSource`] it yields one blank frame per record, sized to
/// cover the crop box; as a [`SegmentExtractor`] it returns that record's
/// segments, keeping only those inside the ROI.
pub struct SegmentReplay {
    records: VecDeque<Vec<Segment>>,
    current: Vec<Segment>,
    frame: Frame,
}

impl SegmentReplay {
    /// Load a JSON-lines replay file
    pub fn open<P: AsRef<Path>>(path: P, crop: &CropBox) -> Result<Self> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: ReplayRecord = serde_json::from_str(&line)
                .inspect_err(|e| log::error!("Replay: {}:{}: {}", path.display(), index + 1, e))?;
            records.push(
                record
                    .segments
                    .iter()
                    .map(|&[x1, y1, x2, y2]| Segment::from_coords(x1, y1, x2, y2))
                    .collect(),
            );
        }

        log::info!("Replay: loaded {} frames from {}", records.len(), path.display());
        Ok(Self::from_records(records, crop))
    }

    /// Build a replay from in-memory records
    pub fn from_records(records: Vec<Vec<Segment>>, crop: &CropBox) -> Self {
        let width = crop.bottom_right.x.max(0) as u32;
        let height = crop.bottom_right.y.max(0) as u32;
        Self {
            records: records.into(),
            current: Vec::new(),
            frame: Frame::blank(width, height, 1),
        }
    }

    /// Records not yet captured
    #[inline]
    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl FrameSource for SegmentReplay {
    fn capture(&mut self) -> Result<Option<Frame>> {
        match self.records.pop_front() {
            Some(segments) => {
                self.current = segments;
                Ok(Some(self.frame.clone()))
            }
            None => Ok(None),
        }
    }
}

impl SegmentExtractor for SegmentReplay {
    fn extract(
        &mut self,
        _view: &FrameView<'_>,
        roi: &RoiPolygon,
        _params: &HoughParams,
    ) -> Result<Vec<Segment>> {
        let segments = std::mem::take(&mut self.current);
        Ok(segments
            .into_iter()
            .filter(|s| roi.contains_segment(s))
            .collect())
    }
}
