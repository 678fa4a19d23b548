//! Transparent overlay canvas drawn over the frame.
//!
//! The canvas is a pixel buffer for box strokes plus a text layer for labels.
//! Every `draw` call starts from a cleared canvas, so the overlay only ever
//! shows the boxes of the most recent call.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};

use crate::detect::BoundingBox;
use crate::frame::FrameSize;

/// Stroke width of box outlines, in pixels.
pub const STROKE_WIDTH: u32 = 3;
/// Label anchor offset from the box's top-left corner.
pub const LABEL_OFFSET_X: i64 = 6;
pub const LABEL_OFFSET_Y: i64 = 20;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Text placed on the overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct Label {
    pub text: String,
    pub x: i64,
    pub y: i64,
    pub color: Rgba<u8>,
}

pub struct Overlay {
    canvas: RgbaImage,
    labels: Vec<Label>,
}

impl Overlay {
    pub fn new(size: FrameSize) -> Self {
        Self {
            canvas: RgbaImage::from_pixel(size.width, size.height, TRANSPARENT),
            labels: Vec::new(),
        }
    }

    pub fn size(&self) -> FrameSize {
        FrameSize::new(self.canvas.width(), self.canvas.height())
    }

    /// Match the canvas to the frame: intrinsic size when known, otherwise the
    /// displayed size. Resizing discards existing annotations.
    pub fn resize(&mut self, intrinsic: Option<FrameSize>, displayed: FrameSize) {
        let size = intrinsic
            .filter(|size| !size.is_empty())
            .unwrap_or(displayed);
        if size != self.size() {
            log::debug!("Overlay: resized {} -> {}", self.size(), size);
        }
        self.canvas = RgbaImage::from_pixel(size.width, size.height, TRANSPARENT);
        self.labels.clear();
    }

    /// Clear the canvas and draw `boxes`.
    pub fn draw(&mut self, boxes: &[BoundingBox]) {
        self.clear();
        for bbox in boxes {
            self.stroke_rect(bbox);
            self.labels.push(Label {
                text: bbox.caption(),
                x: bbox.x + LABEL_OFFSET_X,
                y: bbox.y + LABEL_OFFSET_Y,
                color: bbox.color,
            });
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.canvas.pixels_mut() {
            *pixel = TRANSPARENT;
        }
        self.labels.clear();
    }

    pub fn canvas(&self) -> &RgbaImage {
        &self.canvas
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// True when nothing has been drawn since the last clear.
    pub fn is_blank(&self) -> bool {
        self.labels.is_empty() && self.canvas.pixels().all(|p| *p == TRANSPARENT)
    }

    /// Write the stroke layer as a PNG.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.canvas
            .save_with_format(path, image::ImageFormat::Png)
            .with_context(|| format!("failed to write overlay {}", path.display()))
    }

    /// Stroke the outline centred on the box edges, clipped to the canvas.
    fn stroke_rect(&mut self, bbox: &BoundingBox) {
        let half = (STROKE_WIDTH / 2) as i64;
        let left = bbox.x;
        let top = bbox.y;
        let right = bbox.x + bbox.width as i64;
        let bottom = bbox.y + bbox.height as i64;

        // Horizontal edges.
        for edge_y in [top, bottom] {
            self.fill(left - half, edge_y - half, right + half, edge_y + half, bbox.color);
        }
        // Vertical edges.
        for edge_x in [left, right] {
            self.fill(edge_x - half, top - half, edge_x + half, bottom + half, bbox.color);
        }
    }

    /// Fill the inclusive pixel rectangle `(x0, y0)..=(x1, y1)`.
    fn fill(&mut self, x0: i64, y0: i64, x1: i64, y1: i64, color: Rgba<u8>) {
        let max_x = self.canvas.width() as i64 - 1;
        let max_y = self.canvas.height() as i64 - 1;
        if max_x < 0 || max_y < 0 {
            return;
        }
        let (x0, x1) = (x0.max(0), x1.min(max_x));
        let (y0, y1) = (y0.max(0), y1.min(max_y));
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.canvas.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}
