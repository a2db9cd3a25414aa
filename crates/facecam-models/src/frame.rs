//! Captured camera frames and their metadata.
//!
//! A [`Frame`] is what the capture collaborator hands to the pipeline: an
//! owned pixel buffer plus the metadata needed to turn it into an upright
//! image (dimensions, pixel layout, sensor rotation).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Layout of the bytes in a [`Frame`] buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PixelFormat {
    /// Compressed container (JPEG, PNG, ...) decoded by content sniffing.
    #[default]
    Encoded,

    /// YUV 4:2:0 semi-planar with interleaved V/U chroma (Android camera default).
    Nv21,

    /// 8-bit RGBA, row-major, no padding.
    Rgba8888,

    /// 8-bit RGB, row-major, no padding.
    Rgb888,
}

impl PixelFormat {
    /// Returns the format name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PixelFormat::Encoded => "encoded",
            PixelFormat::Nv21 => "nv21",
            PixelFormat::Rgba8888 => "rgba8888",
            PixelFormat::Rgb888 => "rgb888",
        }
    }

    /// Exact buffer length for a raw frame of the given size.
    ///
    /// Returns `None` for [`PixelFormat::Encoded`], whose length depends on
    /// the compressed payload, and when the length does not fit in `usize`.
    pub fn expected_len(&self, width: u32, height: u32) -> Option<usize> {
        let w = width as usize;
        let h = height as usize;
        let pixels = w.checked_mul(h)?;
        match self {
            PixelFormat::Encoded => None,
            PixelFormat::Nv21 => {
                let chroma = w.div_ceil(2).checked_mul(h.div_ceil(2))?;
                pixels.checked_add(chroma.checked_mul(2)?)
            }
            PixelFormat::Rgba8888 => pixels.checked_mul(4),
            PixelFormat::Rgb888 => pixels.checked_mul(3),
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Clockwise rotation that makes a sensor frame upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// All supported rotations.
    pub const ALL: &'static [Rotation] = &[
        Rotation::Deg0,
        Rotation::Deg90,
        Rotation::Deg180,
        Rotation::Deg270,
    ];

    /// Parse rotation metadata in degrees.
    ///
    /// Values are normalised modulo 360, so `-90` and `450` are accepted.
    pub fn from_degrees(degrees: i32) -> Result<Self, RotationError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Rotation::Deg0),
            90 => Ok(Rotation::Deg90),
            180 => Ok(Rotation::Deg180),
            270 => Ok(Rotation::Deg270),
            _ => Err(RotationError(degrees)),
        }
    }

    /// Rotation in degrees.
    pub fn degrees(&self) -> u32 {
        match self {
            Rotation::Deg0 => 0,
            Rotation::Deg90 => 90,
            Rotation::Deg180 => 180,
            Rotation::Deg270 => 270,
        }
    }

    /// True when applying this rotation swaps width and height.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Rotation::Deg90 | Rotation::Deg270)
    }

    /// Dimensions of a `width` x `height` image after rotation.
    pub fn rotated_dims(&self, width: u32, height: u32) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl FromStr for Rotation {
    type Err = RotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let degrees = s
            .trim()
            .trim_end_matches('°')
            .parse::<i32>()
            .map_err(|_| RotationError(i32::MIN))?;
        Self::from_degrees(degrees)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported rotation: {0} degrees (expected a multiple of 90)")]
pub struct RotationError(pub i32);

/// A captured camera frame.
///
/// Owned by exactly one pipeline invocation and dropped once it has been
/// processed.
pub struct Frame {
    /// Capture sequence number, increasing per frame
    pub seq: u64,
    /// Raw or encoded pixel bytes
    pub data: Vec<u8>,
    /// Sensor-space width in pixels
    pub width: u32,
    /// Sensor-space height in pixels
    pub height: u32,
    /// Layout of `data`
    pub format: PixelFormat,
    /// Rotation needed to make the frame upright
    pub rotation: Rotation,
}

impl Frame {
    /// Create a new frame.
    pub fn new(
        seq: u64,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: PixelFormat,
        rotation: Rotation,
    ) -> Self {
        Self {
            seq,
            data,
            width,
            height,
            format,
            rotation,
        }
    }

    /// Create a frame from an encoded still (JPEG, PNG, ...).
    ///
    /// Dimensions are taken from the decoded payload, so they are left at
    /// zero here.
    pub fn encoded(seq: u64, data: Vec<u8>, rotation: Rotation) -> Self {
        Self::new(seq, data, 0, 0, PixelFormat::Encoded, rotation)
    }

    /// Upright dimensions implied by the frame metadata.
    pub fn upright_dims(&self) -> (u32, u32) {
        self.rotation.rotated_dims(self.width, self.height)
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("seq", &self.seq)
            .field("bytes", &self.data.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("rotation", &self.rotation)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_parse() {
        assert_eq!(Rotation::from_degrees(0).unwrap(), Rotation::Deg0);
        assert_eq!(Rotation::from_degrees(90).unwrap(), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(450).unwrap(), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(45), Err(RotationError(45)));
        assert_eq!("270".parse::<Rotation>().unwrap(), Rotation::Deg270);
        assert!("sideways".parse::<Rotation>().is_err());
    }

    #[test]
    fn test_rotated_dims() {
        for rotation in Rotation::ALL {
            let dims = rotation.rotated_dims(640, 480);
            if rotation.swaps_dimensions() {
                assert_eq!(dims, (480, 640), "{}", rotation);
            } else {
                assert_eq!(dims, (640, 480), "{}", rotation);
            }
        }
    }

    #[test]
    fn test_expected_len() {
        assert_eq!(PixelFormat::Encoded.expected_len(4, 4), None);
        assert_eq!(PixelFormat::Rgb888.expected_len(4, 2), Some(24));
        assert_eq!(PixelFormat::Rgba8888.expected_len(4, 2), Some(32));
        // 4x2 luma + one 2x1 interleaved chroma plane
        assert_eq!(PixelFormat::Nv21.expected_len(4, 2), Some(12));
        // odd sizes round chroma up
        assert_eq!(PixelFormat::Nv21.expected_len(3, 3), Some(9 + 8));
    }

    #[test]
    fn test_expected_len_overflow() {
        for format in [PixelFormat::Nv21, PixelFormat::Rgba8888, PixelFormat::Rgb888] {
            assert_eq!(format.expected_len(u32::MAX, u32::MAX), None, "{}", format);
        }
    }

    #[test]
    fn test_frame_debug_hides_pixels() {
        let frame = Frame::new(7, vec![0; 12], 2, 2, PixelFormat::Rgb888, Rotation::Deg90);
        let debug = format!("{:?}", frame);
        assert!(debug.contains("bytes: 12"));
        assert_eq!(frame.upright_dims(), (2, 2));
    }
}
