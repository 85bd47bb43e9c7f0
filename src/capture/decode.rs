use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::capture::error::DecodeError;
use crate::session::types::{ColorBuffer, DepthBuffer};

/// Convert a biplanar full-range YCbCr 4:2:0 buffer to interleaved 8-bit RGB.
///
/// Uses the BT.601 full-range matrix. Chroma is stored at quarter
/// resolution; each 2×2 luma block reads the same Cb/Cr pair
/// (nearest-neighbour upsampling).
pub fn decode_color(buffer: &ColorBuffer) -> Result<RgbImage, DecodeError> {
    if buffer.width == 0 || buffer.height == 0 {
        return Err(DecodeError::EmptyExtent {
            width: buffer.width,
            height: buffer.height,
        });
    }
    if buffer.luma.len() != buffer.expected_luma_len() {
        return Err(DecodeError::PlaneMismatch {
            plane: "luma",
            actual: buffer.luma.len(),
            expected: buffer.expected_luma_len(),
        });
    }
    if buffer.chroma.len() != buffer.expected_chroma_len() {
        return Err(DecodeError::PlaneMismatch {
            plane: "chroma",
            actual: buffer.chroma.len(),
            expected: buffer.expected_chroma_len(),
        });
    }

    let width = buffer.width as usize;
    let chroma_row = buffer.chroma_width() as usize * 2;
    Ok(RgbImage::from_fn(buffer.width, buffer.height, |x, y| {
        let luma = buffer.luma[y as usize * width + x as usize];
        let pair = (y as usize / 2) * chroma_row + (x as usize / 2) * 2;
        ycbcr_to_rgb(luma, buffer.chroma[pair], buffer.chroma[pair + 1])
    }))
}

/// Visualise a scene-depth buffer as an 8-bit grayscale image.
///
/// Finite samples are min/max normalised with near rendered bright and far
/// dark. Non-finite samples render black. A buffer whose finite samples are
/// all equal (or absent) renders mid-gray throughout rather than failing.
pub fn decode_depth(buffer: &DepthBuffer) -> Result<GrayImage, DecodeError> {
    if buffer.width == 0 || buffer.height == 0 {
        return Err(DecodeError::EmptyExtent {
            width: buffer.width,
            height: buffer.height,
        });
    }
    if buffer.values.len() != buffer.expected_len() {
        return Err(DecodeError::PlaneMismatch {
            plane: "depth",
            actual: buffer.values.len(),
            expected: buffer.expected_len(),
        });
    }

    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &value in &buffer.values {
        if value.is_finite() {
            min = min.min(value);
            max = max.max(value);
        }
    }
    // min > max means no finite sample was seen
    let range = max - min;
    let degenerate = !range.is_finite() || range <= f32::EPSILON;

    let width = buffer.width as usize;
    Ok(GrayImage::from_fn(buffer.width, buffer.height, |x, y| {
        if degenerate {
            return Luma([128]);
        }
        let value = buffer.values[y as usize * width + x as usize];
        if !value.is_finite() {
            return Luma([0]);
        }
        let normalised = (value - min) / range;
        Luma([255 - (normalised * 255.0).round() as u8])
    }))
}

/// BT.601 full-range YCbCr to RGB for one pixel.
fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> Rgb<u8> {
    let y = f32::from(y);
    let cb = f32::from(cb) - 128.0;
    let cr = f32::from(cr) - 128.0;

    let r = y + 1.402 * cr;
    let g = y - 0.344_136 * cb - 0.714_136 * cr;
    let b = y + 1.772 * cb;

    Rgb([quantise(r), quantise(g), quantise(b)])
}

fn quantise(channel: f32) -> u8 {
    channel.round().clamp(0.0, 255.0) as u8
}
