//! Frame Converter
//!
//! Turns a captured [`Frame`] into an [`UprightImage`]: decode the buffer,
//! rotate clockwise by the frame's rotation metadata, and pack into the fixed
//! RGB565 format the detectors consume.
//!
//! # Usage
//! ```rust,ignore
//! use facecam_media::FrameConverter;
//!
//! let mut converter = FrameConverter::new();
//! for frame in frames {
//!     let upright = converter.convert(&frame)?;
//!     // Hand `upright` to a detector...
//! }
//! converter.log_stats();
//! ```

use crate::error::{MediaError, MediaResult};
use crate::metrics;
use crate::upright::UprightImage;
use facecam_models::{Frame, PixelFormat, Rotation};
use image::{imageops, Rgb, RgbImage};
use tracing::{debug, info, warn};

/// Frame converter with running statistics.
#[derive(Debug, Default)]
pub struct FrameConverter {
    /// Frames converted successfully
    frames_processed: u64,
    /// Frames rejected as undecodable
    decode_failures: u64,
}

impl FrameConverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert a frame into an upright RGB565 image.
    ///
    /// 90° and 270° swap width and height; 0° and 180° keep them.
    pub fn convert(&mut self, frame: &Frame) -> MediaResult<UprightImage> {
        let decoded = match decode_rgb(frame) {
            Ok(image) => image,
            Err(e) => {
                self.decode_failures += 1;
                metrics::record_decode_failure(frame.format.as_str());
                warn!(seq = frame.seq, format = %frame.format, error = %e, "Dropping undecodable frame");
                return Err(e);
            }
        };

        let upright = rotate(decoded, frame.rotation);
        debug!(
            seq = frame.seq,
            rotation = %frame.rotation,
            width = upright.width(),
            height = upright.height(),
            "Frame converted"
        );

        self.frames_processed += 1;
        Ok(UprightImage::from_rgb8(&upright))
    }

    /// Parse rotation metadata reported by a capture source.
    pub fn rotation_from_degrees(degrees: i32) -> MediaResult<Rotation> {
        Ok(Rotation::from_degrees(degrees)?)
    }

    /// Get frames processed count.
    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Get decode failure count.
    pub fn decode_failures(&self) -> u64 {
        self.decode_failures
    }

    /// Log converter statistics.
    pub fn log_stats(&self) {
        info!(
            frames = self.frames_processed,
            decode_failures = self.decode_failures,
            "Frame converter stats"
        );
    }
}

fn rotate(image: RgbImage, rotation: Rotation) -> RgbImage {
    match rotation {
        Rotation::Deg0 => image,
        Rotation::Deg90 => imageops::rotate90(&image),
        Rotation::Deg180 => imageops::rotate180(&image),
        Rotation::Deg270 => imageops::rotate270(&image),
    }
}

/// Decode a frame buffer into 8-bit RGB in sensor orientation.
fn decode_rgb(frame: &Frame) -> MediaResult<RgbImage> {
    if frame.format == PixelFormat::Encoded {
        let image = image::load_from_memory(&frame.data)
            .map_err(|e| MediaError::decode(e.to_string()))?
            .to_rgb8();
        if image.width() == 0 || image.height() == 0 {
            return Err(MediaError::decode("decoded image is empty"));
        }
        return Ok(image);
    }

    if frame.width == 0 || frame.height == 0 {
        return Err(MediaError::decode(format!(
            "zero frame dimension: {}x{}",
            frame.width, frame.height
        )));
    }

    // Encoded frames returned above, so `None` means the size overflowed.
    let expected = frame
        .format
        .expected_len(frame.width, frame.height)
        .ok_or_else(|| MediaError::decode("frame dimensions overflow"))?;
    if frame.data.len() != expected {
        return Err(MediaError::decode(format!(
            "{} buffer is {} bytes, expected {} for {}x{}",
            frame.format,
            frame.data.len(),
            expected,
            frame.width,
            frame.height
        )));
    }

    let (w, h) = (frame.width, frame.height);
    let image = match frame.format {
        PixelFormat::Rgb888 => RgbImage::from_raw(w, h, frame.data.clone()),
        PixelFormat::Rgba8888 => {
            let rgb = frame
                .data
                .chunks_exact(4)
                .flat_map(|px| [px[0], px[1], px[2]])
                .collect();
            RgbImage::from_raw(w, h, rgb)
        }
        PixelFormat::Nv21 => Some(nv21_to_rgb(&frame.data, w, h)),
        PixelFormat::Encoded => None,
    };

    image.ok_or_else(|| MediaError::decode("buffer does not fit frame dimensions"))
}

/// NV21 (Y plane followed by interleaved V/U at quarter resolution) to RGB
/// using BT.601 full-range coefficients.
fn nv21_to_rgb(data: &[u8], width: u32, height: u32) -> RgbImage {
    let w = width as usize;
    let h = height as usize;
    let chroma_stride = 2 * w.div_ceil(2);
    let (luma, chroma) = data.split_at(w * h);

    RgbImage::from_fn(width, height, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let luma_value = luma[y * w + x] as f32;
        let uv = (y / 2) * chroma_stride + (x / 2) * 2;
        let v = chroma[uv] as f32 - 128.0;
        let u = chroma[uv + 1] as f32 - 128.0;

        let r = luma_value + 1.402 * v;
        let g = luma_value - 0.344_136 * u - 0.714_136 * v;
        let b = luma_value + 1.772 * u;
        Rgb([clamp_u8(r), clamp_u8(g), clamp_u8(b)])
    })
}

#[inline]
fn clamp_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
