use super::SecondaryDetector;
use crate::constants::CASCADE_SEARCH_PATHS;
use crate::geometry::BoundingBox;
use crate::{Error, Result};
use log::{debug, info, warn};
use opencv::core::{Mat, Rect, Size, Vector};
use opencv::objdetect::CascadeClassifier;
use opencv::prelude::*;
use std::path::{Path, PathBuf};

/// Haar cascade face detector (OpenCV `CascadeClassifier`)
pub struct HaarCascadeDetector {
    classifier: CascadeClassifier,
    scale_factor: f64,
    min_neighbors: i32,
}

impl HaarCascadeDetector {
    /// Load a cascade from an XML file
    ///
    /// # Errors
    ///
    /// Returns [`Error::DetectorUnavailable`] if the file is missing or does not
    /// contain a usable cascade.
    pub fn load<P: AsRef<Path>>(path: P, scale_factor: f64, min_neighbors: i32) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .ok_or_else(|| Error::DetectorUnavailable(format!("Cascade path is not UTF-8: {}", path.display())))?;

        let classifier = CascadeClassifier::new(path_str)
            .map_err(|e| Error::DetectorUnavailable(format!("Failed to load cascade {}: {e}", path.display())))?;
        if classifier.empty()? {
            return Err(Error::DetectorUnavailable(format!(
                "Cascade file {} is empty or malformed",
                path.display()
            )));
        }

        info!("Loaded Haar cascade from {}", path.display());
        Ok(Self {
            classifier,
            scale_factor,
            min_neighbors,
        })
    }

    /// Run the cascade, propagating `OpenCV` failures
    ///
    /// # Errors
    ///
    /// Returns an error if `detectMultiScale` fails, e.g. on an empty image.
    pub fn try_detect(&mut self, gray: &Mat, min_size: i32) -> Result<Vec<BoundingBox>> {
        let mut faces = Vector::<Rect>::new();
        let min_size = min_size.max(1);
        self.classifier.detect_multi_scale(
            gray,
            &mut faces,
            self.scale_factor,
            self.min_neighbors,
            0,
            Size::new(min_size, min_size),
            Size::default(),
        )?;

        Ok(faces.iter().filter_map(BoundingBox::from_rect).collect())
    }
}

impl SecondaryDetector for HaarCascadeDetector {
    fn detect(&mut self, gray: &Mat, min_size: i32) -> Vec<BoundingBox> {
        match self.try_detect(gray, min_size) {
            Ok(faces) => {
                debug!("Cascade found {} candidate(s) at min size {}", faces.len(), min_size);
                faces
            }
            Err(e) => {
                warn!("Cascade detection failed, treating as no faces: {e}");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "haar_cascade"
    }
}

/// Resolve the cascade file: the configured path if it exists, else the first
/// well-known OpenCV install location that does.
#[must_use]
pub fn find_cascade_path(configured: &Path) -> Option<PathBuf> {
    if configured.exists() {
        return Some(configured.to_path_buf());
    }
    CASCADE_SEARCH_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
}
