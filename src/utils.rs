//! Frame preprocessing and numeric helpers.

use crate::{Error, Result};
use log::debug;
use opencv::core::{self, Mat, ROTATE_90_COUNTERCLOCKWISE};
use opencv::imgproc;
use opencv::prelude::*;

/// Width and height of a frame in pixels
#[must_use]
pub fn frame_size(frame: &Mat) -> (i32, i32) {
    (frame.cols(), frame.rows())
}

/// Reject frames that cannot carry a face at all
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] when either dimension is zero.
pub fn ensure_frame_dimensions(frame: &Mat) -> Result<()> {
    let (width, height) = frame_size(frame);
    if width <= 0 || height <= 0 {
        return Err(Error::InvalidInput(format!(
            "Frame has invalid dimensions: {width}x{height}"
        )));
    }
    Ok(())
}

/// Convert a frame to single-channel grayscale, optionally equalising its histogram.
///
/// Histogram equalisation is best effort: if it fails the plain grayscale
/// frame is returned.
///
/// # Errors
///
/// Returns an error if the colour conversion itself fails.
pub fn to_grayscale(frame: &Mat, normalize_contrast: bool) -> Result<Mat> {
    let gray = match frame.channels() {
        1 => frame.try_clone()?,
        4 => convert(frame, imgproc::COLOR_BGRA2GRAY)?,
        _ => convert(frame, imgproc::COLOR_BGR2GRAY)?,
    };

    if !normalize_contrast {
        return Ok(gray);
    }

    let mut equalized = Mat::default();
    match imgproc::equalize_hist(&gray, &mut equalized) {
        Ok(()) => Ok(equalized),
        Err(e) => {
            debug!("Histogram equalisation failed, using plain grayscale: {e}");
            Ok(gray)
        }
    }
}

/// Convert an 8-bit gray, BGR or BGRA frame to 3-channel BGR
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] for other depths or channel counts.
pub fn to_bgr(frame: &Mat) -> Result<Mat> {
    if frame.depth() != core::CV_8U {
        return Err(Error::InvalidInput(format!("Expected an 8-bit frame, got depth {}", frame.depth())));
    }
    match frame.channels() {
        3 => Ok(frame.try_clone()?),
        1 => convert(frame, imgproc::COLOR_GRAY2BGR),
        4 => convert(frame, imgproc::COLOR_BGRA2BGR),
        n => Err(Error::InvalidInput(format!("Unsupported frame with {n} channels"))),
    }
}

fn convert(frame: &Mat, code: i32) -> Result<Mat> {
    let mut out = Mat::default();
    imgproc::cvt_color_def(frame, &mut out, code)?;
    Ok(out)
}

/// Apply the camera orientation settings to a raw capture frame
///
/// # Errors
///
/// Returns an error if rotation or flipping fails.
pub fn orient_frame(frame: &Mat, rotate: bool, mirror: bool) -> Result<Mat> {
    let mut current = if rotate {
        let mut rotated = Mat::default();
        core::rotate(frame, &mut rotated, ROTATE_90_COUNTERCLOCKWISE)?;
        rotated
    } else {
        frame.try_clone()?
    };

    if mirror {
        let mut flipped = Mat::default();
        core::flip(&current, &mut flipped, 1)?;
        current = flipped;
    }

    Ok(current)
}

/// Convert to `i16` with saturation; non-finite values map to zero
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn f64_to_i16_saturating(value: f64) -> i16 {
    if value.is_finite() {
        value.round().clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Scalar, CV_8UC1, CV_8UC3};
    use proptest::prelude::*;

    #[test]
    fn test_to_bgr_accepts_gray_and_bgra() {
        for (cv_type, fill) in [(CV_8UC1, 200.0), (core::CV_8UC4, 200.0), (CV_8UC3, 200.0)] {
            let frame = Mat::new_rows_cols_with_default(12, 16, cv_type, Scalar::all(fill)).unwrap();
            let bgr = to_bgr(&frame).unwrap();
            assert_eq!(bgr.typ(), CV_8UC3);
            assert_eq!(*bgr.at_2d::<core::Vec3b>(6, 8).unwrap(), core::Vec3b::all(200));
        }

        let float = Mat::new_rows_cols_with_default(4, 4, core::CV_32FC3, Scalar::all(0.5)).unwrap();
        assert!(matches!(to_bgr(&float), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_grayscale_has_one_channel() {
        let frame = Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::all(90.0)).unwrap();
        let gray = to_grayscale(&frame, true).unwrap();
        assert_eq!(gray.channels(), 1);
        assert_eq!(frame_size(&gray), (64, 48));
    }

    #[test]
    fn test_grayscale_passthrough_for_single_channel() {
        let frame = Mat::new_rows_cols_with_default(10, 20, CV_8UC1, Scalar::all(7.0)).unwrap();
        let gray = to_grayscale(&frame, false).unwrap();
        assert_eq!(*gray.at_2d::<u8>(3, 3).unwrap(), 7);
    }

    #[test]
    fn test_empty_frame_rejected() {
        let result = ensure_frame_dimensions(&Mat::default());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_rotation_swaps_dimensions() {
        let frame = Mat::new_rows_cols_with_default(48, 64, CV_8UC3, Scalar::all(0.0)).unwrap();
        let rotated = orient_frame(&frame, true, false).unwrap();
        assert_eq!(frame_size(&rotated), (48, 64));

        let mirrored = orient_frame(&frame, false, true).unwrap();
        assert_eq!(frame_size(&mirrored), (64, 48));
    }

    #[test]
    fn test_f64_to_i16_saturating() {
        assert_eq!(f64_to_i16_saturating(12.4), 12);
        assert_eq!(f64_to_i16_saturating(-12.6), -13);
        assert_eq!(f64_to_i16_saturating(1e9), i16::MAX);
        assert_eq!(f64_to_i16_saturating(f64::NAN), 0);
    }

    proptest! {
        #[test]
        fn prop_f64_to_i16_saturating_rounds_in_range(value in -32768.0f64..32767.0) {
            let result = f64_to_i16_saturating(value);
            prop_assert!((f64::from(result) - value).abs() <= 0.5);
        }
    }
}
