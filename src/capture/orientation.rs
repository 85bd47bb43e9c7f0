use crate::session::types::InterfaceOrientation;

/// Rotation applied to a depth image so its visual "up" matches the color
/// image as the user saw it at capture time.
///
/// Only right-angle rotations are needed; each is an exact pixel
/// permutation, no resampling involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// No rotation.
    None,
    /// 90° clockwise.
    Cw90,
    /// 90° counter-clockwise.
    Ccw90,
    /// 180°.
    Half,
}

impl Rotation {
    /// Resolve the rotation for an interface orientation.
    ///
    /// The table is fixed, not configurable. Anything the platform cannot
    /// classify rotates by nothing.
    pub fn from_interface(orientation: InterfaceOrientation) -> Self {
        match orientation {
            InterfaceOrientation::LandscapeLeft => Self::Half,
            InterfaceOrientation::Portrait => Self::Cw90,
            InterfaceOrientation::PortraitUpsideDown => Self::Ccw90,
            InterfaceOrientation::LandscapeRight | InterfaceOrientation::Unknown => Self::None,
        }
    }

    /// Signed angle in degrees, counter-clockwise negative.
    pub fn degrees(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Cw90 => 90,
            Self::Ccw90 => -90,
            Self::Half => 180,
        }
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Cw90 => Self::Ccw90,
            Self::Ccw90 => Self::Cw90,
            Self::Half => Self::Half,
        }
    }

    /// Whether applying this rotation swaps an image's width and height.
    pub fn swaps_extent(self) -> bool {
        matches!(self, Self::Cw90 | Self::Ccw90)
    }
}
