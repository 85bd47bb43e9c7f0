use image::codecs::jpeg::JpegEncoder;
use image::{ImageBuffer, Rgb, RgbImage};
use serde::Serialize;

const JPEG_QUALITY: u8 = 70;

/// Base64 JPEG thumbnail of a captured color image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailPayload {
    pub data: String,
    pub width: u32,
    pub height: u32,
}

/// Downscale a captured color image and encode it for display lists.
///
/// The longest edge is capped at `max_edge` preserving aspect ratio; images
/// already small enough keep their dimensions. Uses `fast_image_resize` for
/// SIMD-accelerated resizing, then encodes to JPEG and base64.
pub fn thumbnail_payload(image: &RgbImage, max_edge: u32) -> ThumbnailPayload {
    let (width, height) = image.dimensions();
    let (thumb_width, thumb_height) = fitted_extent(width, height, max_edge);

    let jpeg = if (thumb_width, thumb_height) == (width, height) {
        compress_jpeg(image.as_raw(), width, height)
    } else {
        let resized = resize_rgb(image.as_raw(), width, height, thumb_width, thumb_height);
        compress_jpeg(&resized, thumb_width, thumb_height)
    };

    ThumbnailPayload {
        data: base64::Engine::encode(&base64::engine::general_purpose::STANDARD, &jpeg),
        width: thumb_width,
        height: thumb_height,
    }
}

/// Largest extent with the same aspect ratio whose longest edge is at most
/// `max_edge`. Never collapses below 1×1.
fn fitted_extent(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge {
        return (width, height);
    }
    let scale = f64::from(max_edge) / f64::from(longest);
    let fitted = |edge: u32| ((f64::from(edge) * scale).round() as u32).max(1);
    (fitted(width), fitted(height))
}

fn resize_rgb(data: &[u8], width: u32, height: u32, dst_width: u32, dst_height: u32) -> Vec<u8> {
    use fast_image_resize as fr;
    use fr::images::Image;

    let src_image = Image::from_vec_u8(width, height, data.to_vec(), fr::PixelType::U8x3)
        .expect("invalid buffer dimensions");
    let mut dst_image = Image::new(dst_width, dst_height, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    resizer
        .resize(&src_image, &mut dst_image, None)
        .expect("resize failed");

    dst_image.into_vec()
}

fn compress_jpeg(data: &[u8], width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, _> =
        ImageBuffer::from_raw(width, height, data).expect("invalid buffer dimensions");

    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    img.write_with_encoder(encoder)
        .expect("JPEG encoding failed");
    buf
}
