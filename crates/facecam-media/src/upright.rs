//! Upright 16-bit RGB images.
//!
//! Detection runs on a fixed RGB565 pixel format, so every frame is packed
//! into it once after rotation. Backends that need 8-bit channels unpack on
//! demand with [`UprightImage::to_rgb8`] or [`UprightImage::to_luma8`].

use facecam_models::CropRegion;
use image::{GrayImage, Rgb, RgbImage};

/// A gravity-correct image in RGB565, derived from exactly one frame.
#[derive(Clone, PartialEq, Eq)]
pub struct UprightImage {
    width: u32,
    height: u32,
    pixels: Vec<u16>,
}

#[inline]
fn pack_565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

#[inline]
fn unpack_565(p: u16) -> [u8; 3] {
    let r = ((p >> 11) & 0x1f) as u8;
    let g = ((p >> 5) & 0x3f) as u8;
    let b = (p & 0x1f) as u8;
    // Replicate high bits into the low bits so full white stays 255.
    [(r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2)]
}

impl UprightImage {
    /// Pack an 8-bit RGB image.
    pub fn from_rgb8(image: &RgbImage) -> Self {
        let pixels = image
            .pixels()
            .map(|Rgb([r, g, b])| pack_565(*r, *g, *b))
            .collect();
        Self {
            width: image.width(),
            height: image.height(),
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// (width, height)
    pub fn dims(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Raw RGB565 pixels, row-major.
    pub fn as_raw(&self) -> &[u16] {
        &self.pixels
    }

    /// Unpacked pixel at (x, y), or `None` out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y as usize * self.width as usize + x as usize;
        self.pixels.get(idx).copied().map(unpack_565)
    }

    /// Unpack to 8-bit RGB.
    pub fn to_rgb8(&self) -> RgbImage {
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let idx = y as usize * self.width as usize + x as usize;
            Rgb(unpack_565(self.pixels[idx]))
        })
    }

    /// 8-bit luma (BT.601 weights), for cascade detectors.
    pub fn to_luma8(&self) -> GrayImage {
        let data = self
            .pixels
            .iter()
            .map(|p| {
                let [r, g, b] = unpack_565(*p);
                ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
            })
            .collect();
        // Length is width * height by construction.
        GrayImage::from_raw(self.width, self.height, data).unwrap_or_default()
    }

    /// Copy out a region as 8-bit RGB.
    ///
    /// Returns `None` when the region does not lie inside the image.
    pub fn crop_rgb8(&self, region: &CropRegion) -> Option<RgbImage> {
        if !region.fits_within(self.width, self.height) {
            return None;
        }
        Some(RgbImage::from_fn(region.width, region.height, |x, y| {
            let idx = (region.y + y) as usize * self.width as usize + (region.x + x) as usize;
            Rgb(unpack_565(self.pixels[idx]))
        }))
    }
}

impl std::fmt::Debug for UprightImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UprightImage({}x{} rgb565)", self.width, self.height)
    }
}
