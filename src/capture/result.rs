use image::{GrayImage, RgbImage};
use serde::Serialize;

/// Outcome of one successful high-resolution capture.
///
/// Immutable once published: the coordinator builds it fully, wraps it in an
/// `Arc`, and replaces the previously published value wholesale. `depth`,
/// when present, has already been rotated so its visual up matches the color
/// image's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResult {
    pub color: RgbImage,
    pub depth: Option<GrayImage>,
    pub width: u32,
    pub height: u32,
}

impl CaptureResult {
    /// Build a result; width and height are taken from the color image.
    pub fn new(color: RgbImage, depth: Option<GrayImage>) -> Self {
        let (width, height) = color.dimensions();
        Self {
            color,
            depth,
            width,
            height,
        }
    }

    /// Human-readable resolution of the color image, e.g. `3840 × 2160`.
    pub fn resolution_text(&self) -> String {
        format!("{} × {}", self.width, self.height)
    }

    /// Pixel-free summary for consumers that only display metadata.
    pub fn info(&self) -> CaptureInfo {
        CaptureInfo {
            width: self.width,
            height: self.height,
            resolution_text: self.resolution_text(),
            has_depth: self.depth.is_some(),
        }
    }
}

/// Serialisable capture metadata (matches frontend expectations).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureInfo {
    pub width: u32,
    pub height: u32,
    pub resolution_text: String,
    pub has_depth: bool,
}
