//! Face thumbnail persistence.
//!
//! Writes the planned crop of the primary face to a single PNG at a fixed
//! path. Each write replaces the previous thumbnail; the file is written to
//! a sibling temp file first and renamed into place so readers never see a
//! partial PNG.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::error::{MediaError, MediaResult};
use crate::metrics;
use crate::upright::UprightImage;
use facecam_models::CropRegion;
use image::ImageFormat;
use tracing::{debug, warn};

/// Outcome of a thumbnail request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailOutcome {
    Written,
    /// Skipped because the previous write is more recent than the interval
    Throttled,
}

/// Writes face thumbnails, last write wins.
#[derive(Debug)]
pub struct ThumbnailWriter {
    path: PathBuf,
    min_interval: Duration,
    last_write: Option<Instant>,
}

impl ThumbnailWriter {
    /// Create a writer that persists every qualifying frame.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            min_interval: Duration::ZERO,
            last_write: None,
        }
    }

    /// Skip writes closer together than `interval`.
    pub fn with_min_interval(mut self, interval: Duration) -> Self {
        self.min_interval = interval;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Crop `image` to `region` and write it as PNG.
    pub fn write(&mut self, image: &UprightImage, region: &CropRegion) -> MediaResult<ThumbnailOutcome> {
        if let Some(last) = self.last_write {
            if last.elapsed() < self.min_interval {
                return Ok(ThumbnailOutcome::Throttled);
            }
        }

        let result = self.write_png(image, region);
        metrics::record_thumbnail(result.is_ok());
        match result {
            Ok(()) => {
                self.last_write = Some(Instant::now());
                debug!(
                    path = %self.path.display(),
                    x = region.x,
                    y = region.y,
                    width = region.width,
                    height = region.height,
                    "Thumbnail written"
                );
                Ok(ThumbnailOutcome::Written)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Thumbnail write failed");
                Err(e)
            }
        }
    }

    fn write_png(&self, image: &UprightImage, region: &CropRegion) -> MediaResult<()> {
        let cropped = image.crop_rgb8(region).ok_or_else(|| {
            MediaError::encode(format!(
                "crop {:?} outside {}x{} image",
                region,
                image.width(),
                image.height()
            ))
        })?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Temp file in the same directory keeps the rename on one filesystem.
        let tmp = self.path.with_extension("png.tmp");
        cropped.save_with_format(&tmp, ImageFormat::Png)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
