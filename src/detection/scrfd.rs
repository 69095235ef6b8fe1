use super::PrimaryDetector;
use crate::constants::{DEFAULT_SCRFD_INPUT_SIZE, IMAGE_NORMALIZATION_OFFSET, IMAGE_NORMALIZATION_SCALE};
use crate::geometry::BoundingBox;
use crate::utils::to_bgr;
use crate::{Error, Result};
use log::{debug, info, warn};
use ndarray::{Array2, Array4, CowArray};
use opencv::core::{Mat, Rect, Scalar, Size, Vec3b, CV_8UC3};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A scored SCRFD detection in frame coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Face box
    pub bbox: BoundingBox,
    /// Confidence score in `[0, 1]`
    pub score: f32,
}

/// Output head layout, inferred from the number of model outputs
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeadLayout {
    strides: Vec<i32>,
    num_anchors: usize,
    /// Index distance between the score head and the bbox head of one stride
    offset: usize,
}

impl HeadLayout {
    fn from_output_count(count: usize) -> Self {
        match count {
            6 | 9 => Self { strides: vec![8, 16, 32], num_anchors: 2, offset: 3 },
            10 | 15 => Self { strides: vec![8, 16, 32, 64, 128], num_anchors: 1, offset: 5 },
            _ => {
                warn!("Unknown SCRFD layout with {count} outputs, assuming 3 strides");
                Self { strides: vec![8, 16, 32], num_anchors: 2, offset: 3 }
            }
        }
    }
}

/// SCRFD face detector using ONNX Runtime
pub struct ScrfdDetector {
    session: Session,
    input_size: (i32, i32),
    conf_threshold: f32,
    nms_threshold: f32,
    layout: HeadLayout,
    anchor_cache: HashMap<(i32, i32, i32), Array2<f32>>,
}

impl ScrfdDetector {
    /// Load an SCRFD ONNX model
    ///
    /// # Errors
    ///
    /// Returns [`Error::DetectorUnavailable`] if the model cannot be loaded.
    pub fn load<P: AsRef<Path>>(model_path: P, conf_threshold: f32, nms_threshold: f32) -> Result<Self> {
        let model_path = model_path.as_ref();
        Self::build(model_path, conf_threshold, nms_threshold).map_err(|e| match e {
            Error::DetectorUnavailable(_) => e,
            other => Error::DetectorUnavailable(format!("{}: {other}", model_path.display())),
        })
    }

    fn build(model_path: &Path, conf_threshold: f32, nms_threshold: f32) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::DetectorUnavailable(format!(
                "SCRFD model not found: {}",
                model_path.display()
            )));
        }

        let environment = Arc::new(
            Environment::builder()
                .with_name("face_joystick_scrfd")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input = session
            .inputs
            .first()
            .ok_or_else(|| Error::DetectorUnavailable("SCRFD model has no inputs".to_string()))?;

        // [batch, channels, height, width]; dynamic axes fall back to 640
        let input_size = if input.dimensions.len() >= 4 {
            let height = input.dimensions[2].map_or(DEFAULT_SCRFD_INPUT_SIZE, |d| d as i32);
            let width = input.dimensions[3].map_or(DEFAULT_SCRFD_INPUT_SIZE, |d| d as i32);
            (width, height)
        } else {
            (DEFAULT_SCRFD_INPUT_SIZE, DEFAULT_SCRFD_INPUT_SIZE)
        };

        let layout = HeadLayout::from_output_count(session.outputs.len());
        info!(
            "Loaded SCRFD model {} (input {}x{}, strides {:?})",
            model_path.display(),
            input_size.0,
            input_size.1,
            layout.strides
        );

        Ok(Self {
            session,
            input_size,
            conf_threshold,
            nms_threshold,
            layout,
            anchor_cache: HashMap::new(),
        })
    }

    /// Detect faces in a BGR frame, highest score first
    ///
    /// # Errors
    ///
    /// Returns an error on malformed frames or inference failure.
    pub fn try_detect(&mut self, frame: &Mat) -> Result<Vec<Detection>> {
        let (frame_width, frame_height) = (frame.cols(), frame.rows());
        if frame_width <= 0 || frame_height <= 0 {
            return Err(Error::InvalidInput("Empty frame passed to SCRFD".to_string()));
        }

        let (canvas, det_scale) = letterbox(frame, self.input_size)?;
        let input = Self::to_tensor(&canvas)?;
        let raw = self.forward(input)?;

        let mut detections: Vec<Detection> = raw
            .into_iter()
            .filter_map(|(x1, y1, x2, y2, score)| {
                let rect = Rect::new(
                    (x1 / det_scale).round() as i32,
                    (y1 / det_scale).round() as i32,
                    ((x2 - x1) / det_scale).round() as i32,
                    ((y2 - y1) / det_scale).round() as i32,
                );
                BoundingBox::from_rect(rect)
                    .and_then(|bbox| bbox.clip_to(frame_width, frame_height))
                    .map(|bbox| Detection { bbox, score })
            })
            .collect();

        detections.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(non_max_suppression(&detections, self.nms_threshold))
    }

    /// BGR `u8` canvas to normalised RGB NCHW tensor
    fn to_tensor(canvas: &Mat) -> Result<Array4<f32>> {
        let height = canvas.rows() as usize;
        let width = canvas.cols() as usize;
        let pixels = canvas.data_typed::<Vec3b>()?;

        Ok(Array4::from_shape_fn((1, 3, height, width), |(_, channel, y, x)| {
            // model expects RGB, the canvas is BGR
            let value = f32::from(pixels[y * width + x][2 - channel]);
            (value - IMAGE_NORMALIZATION_OFFSET) / IMAGE_NORMALIZATION_SCALE
        }))
    }

    /// Run the network and decode every head into `(x1, y1, x2, y2, score)` in canvas pixels
    fn forward(&mut self, input: Array4<f32>) -> Result<Vec<(f32, f32, f32, f32, f32)>> {
        let input_height = input.shape()[2] as i32;
        let input_width = input.shape()[3] as i32;

        let cow = CowArray::from(input.into_dyn());
        let tensor = Value::from_array(self.session.allocator(), &cow)?;
        let outputs = self.session.run(vec![tensor])?;

        let strides = self.layout.strides.clone();
        let mut decoded = Vec::new();

        for (idx, &stride) in strides.iter().enumerate() {
            let bbox_idx = idx + self.layout.offset;
            let (Some(score_out), Some(bbox_out)) = (outputs.get(idx), outputs.get(bbox_idx)) else {
                return Err(Error::DetectorUnavailable(format!(
                    "SCRFD model is missing output heads for stride {stride}"
                )));
            };

            let scores = score_out.try_extract::<f32>()?;
            let distances = bbox_out.try_extract::<f32>()?;
            let scores: Vec<f32> = scores.view().iter().copied().collect();
            let distances: Vec<f32> = distances.view().iter().copied().collect();

            let key = (input_height / stride, input_width / stride, stride);
            let num_anchors = self.layout.num_anchors;
            let anchors = self
                .anchor_cache
                .entry(key)
                .or_insert_with(|| anchor_centers(key.0, key.1, stride, num_anchors));

            decoded.extend(decode_head(
                anchors,
                &scores,
                &distances,
                stride,
                self.conf_threshold,
                (input_width as f32, input_height as f32),
            ));
        }

        Ok(decoded)
    }
}

impl PrimaryDetector for ScrfdDetector {
    fn detect(&mut self, frame: &Mat) -> Vec<BoundingBox> {
        match self.try_detect(frame) {
            Ok(detections) => {
                debug!("SCRFD found {} face(s)", detections.len());
                detections.into_iter().map(|d| d.bbox).collect()
            }
            Err(e) => {
                warn!("SCRFD detection failed, treating as no faces: {e}");
                Vec::new()
            }
        }
    }

    fn name(&self) -> &str {
        "scrfd"
    }
}

/// Resize keeping aspect ratio and pad to `(width, height)` as a BGR canvas
fn letterbox(frame: &Mat, input_size: (i32, i32)) -> Result<(Mat, f32)> {
    // the canvas is 8-bit BGR, so the resized image must be too or copy_to reallocates
    let converted;
    let frame = if frame.typ() == CV_8UC3 {
        frame
    } else {
        converted = to_bgr(frame)?;
        &converted
    };

    let (input_width, input_height) = input_size;
    let image_ratio = frame.rows() as f32 / frame.cols() as f32;
    let model_ratio = input_height as f32 / input_width as f32;

    let (new_width, new_height) = if image_ratio > model_ratio {
        ((input_height as f32 / image_ratio) as i32, input_height)
    } else {
        (input_width, (input_width as f32 * image_ratio) as i32)
    };
    let (new_width, new_height) = (new_width.max(1), new_height.max(1));
    let det_scale = new_height as f32 / frame.rows() as f32;

    let mut resized = Mat::default();
    imgproc::resize(
        frame,
        &mut resized,
        Size::new(new_width, new_height),
        0.0,
        0.0,
        InterpolationFlags::INTER_LINEAR as i32,
    )?;

    let mut canvas = Mat::new_rows_cols_with_default(input_height, input_width, CV_8UC3, Scalar::all(0.0))?;
    let mut roi = canvas.roi_mut(Rect::new(0, 0, new_width, new_height))?;
    resized.copy_to(&mut roi)?;

    Ok((canvas, det_scale))
}

/// Anchor centres for one feature map, `num_anchors` copies per cell
fn anchor_centers(height: i32, width: i32, stride: i32, num_anchors: usize) -> Array2<f32> {
    let centers: Vec<f32> = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .flat_map(|(x, y)| std::iter::repeat([(x * stride) as f32, (y * stride) as f32]).take(num_anchors))
        .flatten()
        .collect();
    let rows = centers.len() / 2;
    Array2::from_shape_vec((rows, 2), centers).unwrap_or_else(|_| Array2::zeros((0, 2)))
}

/// Turn one stride's distance predictions into scored boxes above `threshold`,
/// clipped to the `(width, height)` canvas
fn decode_head(
    anchors: &Array2<f32>,
    scores: &[f32],
    distances: &[f32],
    stride: i32,
    threshold: f32,
    bounds: (f32, f32),
) -> Vec<(f32, f32, f32, f32, f32)> {
    let stride = stride as f32;
    let (max_w, max_h) = bounds;
    scores
        .iter()
        .enumerate()
        .filter(|(_, &score)| score >= threshold)
        .filter_map(|(i, &score)| {
            let d = distances.get(i * 4..i * 4 + 4)?;
            let cx = *anchors.get([i, 0])?;
            let cy = *anchors.get([i, 1])?;
            // f32::max/min also map NaN to the bound
            let x1 = (cx - d[0] * stride).max(0.0).min(max_w);
            let y1 = (cy - d[1] * stride).max(0.0).min(max_h);
            let x2 = (cx + d[2] * stride).max(0.0).min(max_w);
            let y2 = (cy + d[3] * stride).max(0.0).min(max_h);
            (x2 > x1 && y2 > y1).then_some((x1, y1, x2, y2, score))
        })
        .collect()
}

/// Intersection over union of two boxes
fn iou(a: &BoundingBox, b: &BoundingBox) -> f32 {
    let x1 = i64::from(a.x.max(b.x));
    let y1 = i64::from(a.y.max(b.y));
    let x2 = a.right().min(b.right());
    let y2 = a.bottom().min(b.bottom());

    let inter = (x2 - x1).max(0) as f32 * (y2 - y1).max(0) as f32;
    let union = a.area() as f32 + b.area() as f32 - inter;
    if union <= 0.0 {
        0.0
    } else {
        inter / union
    }
}

/// Greedy NMS over detections sorted by descending score
fn non_max_suppression(sorted: &[Detection], threshold: f32) -> Vec<Detection> {
    let mut keep: Vec<Detection> = Vec::new();
    for candidate in sorted {
        if keep.iter().all(|kept| iou(&kept.bbox, &candidate.bbox) <= threshold) {
            keep.push(*candidate);
        }
    }
    keep
}
