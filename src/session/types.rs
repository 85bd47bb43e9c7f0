use serde::{Deserialize, Serialize};

/// Biplanar full-range YCbCr 4:2:0 color buffer as delivered by the session.
///
/// The luma plane is full resolution; the chroma plane holds interleaved
/// Cb/Cr pairs at half resolution in both dimensions, so every 2×2 luma
/// block shares one chroma sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorBuffer {
    pub width: u32,
    pub height: u32,
    pub luma: Vec<u8>,
    pub chroma: Vec<u8>,
}

impl ColorBuffer {
    /// Width of the chroma plane in Cb/Cr pairs (half width, rounded up).
    pub fn chroma_width(&self) -> u32 {
        self.width.div_ceil(2)
    }

    /// Height of the chroma plane (half height, rounded up).
    pub fn chroma_height(&self) -> u32 {
        self.height.div_ceil(2)
    }

    /// Byte length the luma plane must have for the stated dimensions.
    pub fn expected_luma_len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Byte length the chroma plane must have (two bytes per pair).
    pub fn expected_chroma_len(&self) -> usize {
        self.chroma_width() as usize * self.chroma_height() as usize * 2
    }
}

/// Single-channel scene-depth buffer, row-major metres from the camera.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthBuffer {
    pub width: u32,
    pub height: u32,
    pub values: Vec<f32>,
}

impl DepthBuffer {
    /// Number of samples the buffer must hold for the stated dimensions.
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Frame delivered by a completed high-resolution capture request.
///
/// Depth is optional: the session only attaches it when depth sensing was
/// active for the frame, and most platforms never attach it to the high-res
/// capture path at all (the coordinator fetches depth separately).
#[derive(Debug, Clone)]
pub struct HighResFrame {
    pub color: ColorBuffer,
    pub depth: Option<DepthBuffer>,
}

/// Rotation state of the device display as perceived by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceOrientation {
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    #[default]
    LandscapeRight,
    /// Orientation could not be determined (e.g. no display attached).
    Unknown,
}
