//! Raster frames and zero-copy crop views

use super::geometry::CropBox;
use super::types::Point;
use crate::error::{Error, Result};
use std::sync::Arc;

/// Color raster frame (row-major, interleaved channels)
///
/// Pixel storage is reference counted so sources can hand out the same
/// buffer repeatedly without copying.
#[derive(Clone, Debug)]
pub struct Frame {
    width: u32,
    height: u32,
    channels: u8,
    pixels: Arc<[u8]>,
}

impl Frame {
    /// Wrap existing pixel data, checking the buffer length
    pub fn new(width: u32, height: u32, channels: u8, pixels: Arc<[u8]>) -> Result<Self> {
        let expected = width as usize * height as usize * channels as usize;
        if pixels.len() != expected {
            return Err(Error::Other(format!(
                "frame buffer has {} bytes, expected {} ({}x{}x{})",
                pixels.len(),
                expected,
                width,
                height,
                channels
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// All-black frame
    pub fn blank(width: u32, height: u32, channels: u8) -> Self {
        let len = width as usize * height as usize * channels as usize;
        Self {
            width,
            height,
            channels,
            pixels: Arc::from(vec![0u8; len]),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Borrow a cropped region without copying pixels
    pub fn crop(&self, crop: &CropBox) -> Result<FrameView<'_>> {
        let br = crop.bottom_right;
        if crop.top_left.x < 0
            || crop.top_left.y < 0
            || br.x > self.width as i32
            || br.y > self.height as i32
        {
            return Err(Error::CropOutOfBounds(format!(
                "crop {} -> {} exceeds {}x{} frame",
                crop.top_left, br, self.width, self.height
            )));
        }
        Ok(FrameView {
            frame: self,
            origin: crop.top_left,
            size: crop.size(),
        })
    }
}

/// Cropped window into a [`Frame`]
#[derive(Clone, Copy, Debug)]
pub struct FrameView<'a> {
    frame: &'a Frame,
    origin: Point,
    size: Point,
}

impl FrameView<'_> {
    /// View width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.size.x as u32
    }

    /// View height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.size.y as u32
    }

    /// Top-left corner of the view in full-frame coordinates
    #[inline]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Channel bytes of the pixel at view coordinates `(x, y)`
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width() || y >= self.height() {
            return None;
        }
        let channels = self.frame.channels as usize;
        let fx = self.origin.x as usize + x as usize;
        let fy = self.origin.y as usize + y as usize;
        let start = (fy * self.frame.width as usize + fx) * channels;
        self.frame.pixels.get(start..start + channels)
    }

    /// One row of the view as contiguous channel bytes
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        if y >= self.height() {
            return None;
        }
        let channels = self.frame.channels as usize;
        let fy = self.origin.y as usize + y as usize;
        let start = (fy * self.frame.width as usize + self.origin.x as usize) * channels;
        self.frame
            .pixels
            .get(start..start + self.width() as usize * channels)
    }
}
