//! Frames and frame sizes.
//!
//! - `FrameSize`: pixel dimensions of a frame, canvas or display area.
//! - `Frame`: owned RGBA pixels of the current visual source (a live camera
//!   frame or a loaded image).
//!
//! Frames are captured on demand (detection, snapshot). The session never keeps
//! a history of frames.

use std::fmt;

use anyhow::{anyhow, Result};
use image::{imageops::FilterType, RgbaImage};

/// Pixel dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for FrameSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

// ----------------------------------------------------------------------------
// Frame
// ----------------------------------------------------------------------------

/// One captured frame.
#[derive(Clone)]
pub struct Frame {
    pixels: RgbaImage,
}

impl Frame {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Build a frame from tightly packed RGB bytes.
    pub fn from_rgb(width: u32, height: u32, rgb: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize * 3;
        if rgb.len() != expected {
            return Err(anyhow!(
                "rgb buffer has {} bytes, expected {} for {}x{}",
                rgb.len(),
                expected,
                width,
                height
            ));
        }
        let mut pixels = RgbaImage::new(width, height);
        for (dst, src) in pixels.pixels_mut().zip(rgb.chunks_exact(3)) {
            dst.0 = [src[0], src[1], src[2], 255];
        }
        Ok(Self { pixels })
    }

    /// Intrinsic dimensions of the frame.
    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.pixels.width(), self.pixels.height())
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Copy of the frame scaled to `size`. Returns an identical copy when the
    /// size already matches.
    pub fn scaled_to(&self, size: FrameSize) -> RgbaImage {
        if size == self.size() {
            return self.pixels.clone();
        }
        image::imageops::resize(&self.pixels, size.width, size.height, FilterType::Triangle)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame").field("size", &self.size()).finish()
    }
}
