//! Crop region computation for face thumbnails.
//!
//! The crop is sized from the rounded eye distance `s`: `3s` wide and `4s`
//! tall, placed `3s` left of the eye midpoint and `11s/3` above it so the
//! whole head fits. The region is clamped to the image, never shifted.

use facecam_models::{CropRegion, FaceRecord};

/// Smallest rounded eye distance that produces a crop.
pub const DEFAULT_MIN_EYE_DISTANCE: u32 = 40;

/// Round half up, as a capture pipeline working in ints would.
#[inline]
fn round_half_up(v: f32) -> i64 {
    (v + 0.5).floor() as i64
}

/// Crop planner for face thumbnails.
#[derive(Debug, Clone, Copy)]
pub struct CropPlanner {
    min_eye_distance: u32,
}

impl Default for CropPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_EYE_DISTANCE)
    }
}

impl CropPlanner {
    pub fn new(min_eye_distance: u32) -> Self {
        Self { min_eye_distance }
    }

    pub fn min_eye_distance(&self) -> u32 {
        self.min_eye_distance
    }

    /// Plan a crop around the first face only.
    pub fn plan_first(
        &self,
        faces: &[FaceRecord],
        image_width: u32,
        image_height: u32,
    ) -> Option<CropRegion> {
        faces
            .first()
            .and_then(|face| self.plan(face, image_width, image_height))
    }

    /// Plan a crop around one face.
    ///
    /// Returns `None` for faces too small to be worth keeping, and for faces
    /// whose crop origin would lie outside the image.
    pub fn plan(&self, face: &FaceRecord, image_width: u32, image_height: u32) -> Option<CropRegion> {
        if !face.is_finite() {
            return None;
        }

        let space = round_half_up(face.eyes_distance);
        if space < self.min_eye_distance as i64 {
            return None;
        }

        // Finite but huge values saturate instead of overflowing.
        let (w, h) = (image_width as i64, image_height as i64);
        let default_width = space.saturating_mul(3).min(w);
        let default_height = space.saturating_mul(4).min(h);

        let clip_x = round_half_up(face.mid_x)
            .saturating_sub(space.saturating_mul(3))
            .max(0);
        let clip_y = round_half_up(face.mid_y)
            .saturating_sub(space.saturating_mul(11) / 3)
            .max(0);
        if clip_x >= w || clip_y >= h {
            return None;
        }

        let clip_width = if clip_x + default_width > w {
            w - clip_x
        } else {
            default_width
        };
        let clip_height = if clip_y + default_height > h {
            h - clip_y
        } else {
            default_height
        };

        Some(CropRegion::new(
            clip_x as u32,
            clip_y as u32,
            clip_width as u32,
            clip_height as u32,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face(x: f32, y: f32, eyes: f32) -> FaceRecord {
        FaceRecord::new(x, y, eyes, 1.0)
    }

    #[test]
    fn test_small_face_has_no_crop() {
        let planner = CropPlanner::default();
        assert_eq!(planner.plan(&face(500.0, 500.0, 39.0), 1000, 1000), None);
        // 39.5 rounds up to 40
        assert!(planner.plan(&face(500.0, 500.0, 39.5), 1000, 1000).is_some());
    }

    #[test]
    fn test_clamped_at_origin() {
        let planner = CropPlanner::default();
        let region = planner.plan(&face(50.0, 50.0, 40.0), 1000, 1000).unwrap();
        assert_eq!(region, CropRegion::new(0, 0, 120, 160));
    }

    #[test]
    fn test_centered_face() {
        let planner = CropPlanner::default();
        let region = planner.plan(&face(500.0, 500.0, 60.0), 1000, 1000).unwrap();
        // 11 * 60 / 3 = 220
        assert_eq!(region, CropRegion::new(320, 280, 180, 240));
    }

    #[test]
    fn test_clamped_at_far_edge() {
        let planner = CropPlanner::default();
        let region = planner.plan(&face(990.0, 990.0, 40.0), 1000, 1000).unwrap();
        // 11 * 40 / 3 = 146 (integer division)
        assert_eq!(region, CropRegion::new(870, 844, 120, 156));
        assert!(region.fits_within(1000, 1000));
    }

    #[test]
    fn test_default_size_limited_by_image() {
        let planner = CropPlanner::default();
        let region = planner.plan(&face(50.0, 50.0, 40.0), 100, 100).unwrap();
        assert_eq!(region, CropRegion::new(0, 0, 100, 100));
    }

    #[test]
    fn test_midpoint_outside_image() {
        let planner = CropPlanner::default();
        assert_eq!(planner.plan(&face(2000.0, 50.0, 40.0), 1000, 1000), None);
    }

    #[test]
    fn test_huge_eye_distance_covers_image() {
        let planner = CropPlanner::default();
        let region = planner.plan(&face(10.0, 10.0, 1e30), 100, 100).unwrap();
        assert_eq!(region, CropRegion::new(0, 0, 100, 100));
    }

    #[test]
    fn test_huge_midpoint_has_no_crop() {
        let planner = CropPlanner::default();
        assert_eq!(planner.plan(&face(1e30, 1e30, 40.0), 100, 100), None);
        let region = planner.plan(&face(-1e30, -1e30, 40.0), 100, 100).unwrap();
        assert_eq!(region, CropRegion::new(0, 0, 100, 100));
    }

    #[test]
    fn test_first_wins() {
        let planner = CropPlanner::default();
        let faces = [face(10.0, 10.0, 5.0), face(500.0, 500.0, 60.0)];
        // the larger second face is ignored
        assert_eq!(planner.plan_first(&faces, 1000, 1000), None);
        assert_eq!(planner.plan_first(&[], 1000, 1000), None);
    }

    #[test]
    fn test_configurable_minimum() {
        let planner = CropPlanner::new(10);
        assert!(planner.plan(&face(500.0, 500.0, 12.0), 1000, 1000).is_some());
    }
}
