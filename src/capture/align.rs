use image::{imageops, ImageBuffer, Pixel};

use crate::capture::orientation::Rotation;

/// Rotate an image about its centre by a right angle.
///
/// Quarter turns swap the output dimensions, a half turn preserves them, and
/// `Rotation::None` hands the input straight back without touching a pixel.
/// Every case is an exact permutation of the input pixels: nothing is
/// cropped, resampled, or rescaled, so rotating by an angle and then its
/// inverse restores the original image bit for bit.
pub fn rotated<P>(
    image: ImageBuffer<P, Vec<P::Subpixel>>,
    rotation: Rotation,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    match rotation {
        Rotation::None => image,
        Rotation::Cw90 => imageops::rotate90(&image),
        Rotation::Ccw90 => imageops::rotate270(&image),
        Rotation::Half => imageops::rotate180(&image),
    }
}
