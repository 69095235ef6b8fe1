//! Main application: capture, tracking, joystick mapping, output and display.

use crate::{
    config::{Config, DisplayConfig},
    constants::{FACE_BLUR_KERNEL, FACE_BLUR_SIGMA},
    detection::{
        cascade::{find_cascade_path, HaarCascadeDetector},
        scrfd::ScrfdDetector,
        PrimaryDetector, SecondaryDetector, UnavailableDetector,
    },
    error::Result,
    geometry::BoundingBox,
    joystick::{JoystickConfig, JoystickMapper, JoystickSample, JoystickValue},
    motion::PyramidalLkTracker,
    output::{create_sink, NullSink, OutputSink},
    tracking::{TrackingController, TrackingOutcome, TrackingPhase},
    utils::{frame_size, orient_frame},
};
use log::{debug, info, warn};
use opencv::{
    core::{Mat, Point, Rect, Scalar, Size, BORDER_DEFAULT},
    highgui::{self, WINDOW_FULLSCREEN, WINDOW_NORMAL, WND_PROP_FULLSCREEN},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};
use std::time::{Duration, Instant};

const TRACKBAR_DEADZONE_X: &str = "Deadzone X";
const TRACKBAR_DEADZONE_Y: &str = "Deadzone Y";
const TRACKBAR_SENSITIVITY_X: &str = "Sensitivity X";
const TRACKBAR_SENSITIVITY_Y: &str = "Sensitivity Y";
const TRACKBAR_SMOOTHING: &str = "Smoothing %";

const DEADZONE_TRACKBAR_MAX: i32 = 100;
const SENSITIVITY_TRACKBAR_MAX: i32 = 20;
const SMOOTHING_TRACKBAR_MAX: i32 = 100;
// upper bound for trackbar ranges widened from the config
const TRACKBAR_LIMIT: i32 = 10_000;

const KEY_ESCAPE: i32 = 27;

/// Video source type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// Webcam index
    Camera(i32),
    /// Video file path
    File(String),
}

/// What a key press asks the main loop to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing bound to this key
    None,
    /// Capture a new joystick reference from the next face
    ResetReference,
    /// Drop tracking memory and the reference, then search again
    ResetTracking,
    /// Leave the main loop
    Quit,
}

impl KeyAction {
    /// Decode a `highgui::wait_key` result
    #[must_use]
    pub fn from_key(key: i32) -> Self {
        if key == KEY_ESCAPE {
            return Self::Quit;
        }
        match u8::try_from(key & 0xFF).map(char::from) {
            Ok('q' | 'Q') if key >= 0 => Self::Quit,
            Ok('r' | 'R') if key >= 0 => Self::ResetReference,
            Ok('t' | 'T') if key >= 0 => Self::ResetTracking,
            _ => Self::None,
        }
    }
}

/// Upper ends of the dead zone and sensitivity trackbars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackbarRanges {
    /// Largest selectable dead zone in pixels
    pub deadzone_max: i32,
    /// Largest selectable gain
    pub sensitivity_max: i32,
}

impl Default for TrackbarRanges {
    fn default() -> Self {
        Self {
            deadzone_max: DEADZONE_TRACKBAR_MAX,
            sensitivity_max: SENSITIVITY_TRACKBAR_MAX,
        }
    }
}

impl TrackbarRanges {
    /// Default ranges, widened so every value of `config` fits
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn for_config(config: &JoystickConfig) -> Self {
        let fit = |default: i32, values: [f64; 2]| {
            values
                .into_iter()
                .filter(|v| v.is_finite())
                .map(|v| v.ceil().clamp(0.0, f64::from(TRACKBAR_LIMIT)) as i32)
                .fold(default, i32::max)
        };
        Self {
            deadzone_max: fit(DEADZONE_TRACKBAR_MAX, [config.deadzone_x, config.deadzone_y]),
            sensitivity_max: fit(SENSITIVITY_TRACKBAR_MAX, [config.sensitivity_x, config.sensitivity_y]),
        }
    }
}

/// Raw trackbar positions as read from the window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackbarPositions {
    /// Horizontal dead zone in pixels
    pub deadzone_x: i32,
    /// Vertical dead zone in pixels
    pub deadzone_y: i32,
    /// Horizontal gain
    pub sensitivity_x: i32,
    /// Vertical gain
    pub sensitivity_y: i32,
    /// Smoothing factor in percent
    pub smoothing_percent: i32,
}

impl TrackbarPositions {
    /// Positions showing `config`, rounded and clamped to `ranges`
    #[must_use]
    pub fn from_config(config: &JoystickConfig, ranges: TrackbarRanges) -> Self {
        Self {
            deadzone_x: trackbar_position(config.deadzone_x, ranges.deadzone_max),
            deadzone_y: trackbar_position(config.deadzone_y, ranges.deadzone_max),
            sensitivity_x: trackbar_position(config.sensitivity_x, ranges.sensitivity_max),
            sensitivity_y: trackbar_position(config.sensitivity_y, ranges.sensitivity_max),
            smoothing_percent: trackbar_position(config.smoothing_factor * 100.0, SMOOTHING_TRACKBAR_MAX),
        }
    }

    /// Joystick parameters for these positions.
    ///
    /// Smoothing is clamped to at least 1 percent so the factor stays in `(0, 1]`.
    #[must_use]
    pub fn to_config(&self, ranges: TrackbarRanges) -> JoystickConfig {
        let deadzone = |value: i32| f64::from(value.clamp(0, ranges.deadzone_max));
        let sensitivity = |value: i32| f64::from(value.clamp(0, ranges.sensitivity_max));
        JoystickConfig {
            deadzone_x: deadzone(self.deadzone_x),
            deadzone_y: deadzone(self.deadzone_y),
            sensitivity_x: sensitivity(self.sensitivity_x),
            sensitivity_y: sensitivity(self.sensitivity_y),
            smoothing_factor: f64::from(self.smoothing_percent.clamp(1, SMOOTHING_TRACKBAR_MAX)) / 100.0,
        }
    }
}

/// Names of the settings in `config` that the trackbars cannot show exactly
#[must_use]
pub fn trackbar_adjusted_settings(config: &JoystickConfig, ranges: TrackbarRanges) -> Vec<&'static str> {
    let shown = TrackbarPositions::from_config(config, ranges).to_config(ranges);
    [
        ("deadzone_x", config.deadzone_x, shown.deadzone_x),
        ("deadzone_y", config.deadzone_y, shown.deadzone_y),
        ("sensitivity_x", config.sensitivity_x, shown.sensitivity_x),
        ("sensitivity_y", config.sensitivity_y, shown.sensitivity_y),
        ("smoothing_factor", config.smoothing_factor, shown.smoothing_factor),
    ]
    .into_iter()
    .filter(|(_, wanted, shown)| (wanted - shown).abs() > 1e-9)
    .map(|(name, _, _)| name)
    .collect()
}

#[allow(clippy::cast_possible_truncation)]
fn trackbar_position(value: f64, max: i32) -> i32 {
    if value.is_finite() {
        value.round().clamp(0.0, f64::from(max)) as i32
    } else {
        0
    }
}

/// Everything that happened to one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameReport {
    /// Face tracking result
    pub outcome: TrackingOutcome,
    /// Mapped joystick sample, absent when there was no face to map
    pub sample: Option<JoystickSample>,
    /// Value delivered to the output sink
    pub output: JoystickValue,
}

/// Tracking, mapping and output for a stream of frames, without capture or display
pub struct FacePipeline {
    tracker: TrackingController,
    mapper: JoystickMapper,
    sink: Box<dyn OutputSink>,
}

impl FacePipeline {
    /// Assemble a pipeline from its parts
    pub fn new(tracker: TrackingController, sink: Box<dyn OutputSink>) -> Self {
        Self {
            tracker,
            mapper: JoystickMapper::new(),
            sink,
        }
    }

    /// Track, map and output one (already oriented) frame.
    ///
    /// Frames without a face send the neutral value. Output failures are
    /// logged and do not stop the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error for a frame with zero width or height.
    pub fn process(&mut self, frame: &Mat, joystick: &JoystickConfig) -> Result<FrameReport> {
        let outcome = self.tracker.process_frame(frame)?;
        let (width, height) = frame_size(frame);
        let sample = self
            .mapper
            .update(width, height, outcome.face.map(|face| face.center()), joystick);
        let output = sample.map_or_else(JoystickValue::default, |sample| sample.smoothed);

        if let Err(e) = self.sink.send(output) {
            warn!("{} output failed: {e}", self.sink.name());
        }

        Ok(FrameReport {
            outcome,
            sample,
            output,
        })
    }

    /// Act on a key press; returns `false` when the loop should stop
    pub fn handle_key(&mut self, action: KeyAction) -> bool {
        match action {
            KeyAction::None => {}
            KeyAction::ResetReference => self.mapper.reset_reference(),
            KeyAction::ResetTracking => {
                self.tracker.reset();
                self.mapper.reset_reference();
            }
            KeyAction::Quit => {
                info!("Exit requested by user");
                return false;
            }
        }
        true
    }

    /// Reference position of the joystick mapper
    #[must_use]
    pub const fn reference(&self) -> Option<(f64, f64)> {
        self.mapper.reference()
    }

    /// Current tracking phase
    #[must_use]
    pub const fn phase(&self) -> TrackingPhase {
        self.tracker.phase()
    }

    /// Return the output device to neutral
    ///
    /// # Errors
    ///
    /// Returns an error if the sink cannot be released.
    pub fn release(&mut self) -> Result<()> {
        self.sink.release()
    }
}

/// Load the primary detector, or a placeholder reporting no faces
pub fn load_primary_detector(config: &Config) -> Box<dyn PrimaryDetector> {
    let detection = &config.detection;
    match ScrfdDetector::load(
        &config.models.face_detector,
        detection.confidence_threshold,
        detection.nms_threshold,
    ) {
        Ok(detector) => Box::new(detector),
        Err(e) => Box::new(UnavailableDetector::new("SCRFD", e.to_string())),
    }
}

/// Load the cascade detector, or a placeholder reporting no faces
pub fn load_secondary_detector(config: &Config) -> Box<dyn SecondaryDetector> {
    let Some(path) = find_cascade_path(&config.models.face_cascade) else {
        return Box::new(UnavailableDetector::new(
            "Haar cascade",
            format!("no cascade found at {} or system locations", config.models.face_cascade.display()),
        ));
    };
    let detection = &config.detection;
    match HaarCascadeDetector::load(&path, detection.cascade_scale_factor, detection.cascade_min_neighbors) {
        Ok(detector) => Box::new(detector),
        Err(e) => Box::new(UnavailableDetector::new("Haar cascade", e.to_string())),
    }
}

/// Main application struct
pub struct FaceJoystickApp {
    config: Config,
    video_source: VideoSource,
    video_capture: VideoCapture,
    pipeline: FacePipeline,
    trackbar_ranges: TrackbarRanges,
}

impl FaceJoystickApp {
    /// Open the video source, load detectors and the output sink, create the window
    ///
    /// # Errors
    ///
    /// Returns an error if the video source cannot be opened or the window
    /// cannot be created. Missing models and an unreachable X server only
    /// degrade functionality.
    pub fn new(config: Config, video_source: VideoSource) -> Result<Self> {
        info!("Initializing face joystick application");

        let video_capture = match &video_source {
            VideoSource::Camera(index) => {
                info!("Opening camera {index}");
                let mut cap = VideoCapture::new(*index, videoio::CAP_ANY)?;
                cap.set(CAP_PROP_BUFFERSIZE, 1.0)?;
                cap
            }
            VideoSource::File(path) => {
                info!("Opening video file: {path}");
                VideoCapture::from_file(path, videoio::CAP_ANY)?
            }
        };
        if !video_capture.is_opened()? {
            return Err(crate::Error::InvalidInput(format!("Cannot open video source {video_source:?}")));
        }

        let tracking = &config.tracking;
        let tracker = TrackingController::new(
            load_primary_detector(&config),
            load_secondary_detector(&config),
            Box::new(PyramidalLkTracker::new(tracking.flow_window, tracking.flow_pyramid_levels)),
            tracking.clone(),
        );

        let sink = match create_sink(config.output.mode, config.output.cursor_speed) {
            Ok(sink) => {
                info!("Sending joystick values to {} output", sink.name());
                sink
            }
            Err(e) => {
                warn!("Failed to initialize {:?} output, values will be discarded: {e}", config.output.mode);
                Box::new(NullSink)
            }
        };

        let trackbar_ranges = TrackbarRanges::for_config(&config.joystick);
        if config.display.enabled {
            create_window(&config.display, &config.joystick, trackbar_ranges)?;
        }

        Ok(Self {
            pipeline: FacePipeline::new(tracker, sink),
            trackbar_ranges,
            config,
            video_source,
            video_capture,
        })
    }

    /// Run the main application loop until the source ends or the user quits
    ///
    /// # Errors
    ///
    /// Returns an error if capture or display fails.
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");

        let mut frame_count: u64 = 0;
        let start_time = Instant::now();
        let mut last_fps_update = Instant::now();
        let mut fps = 0.0;

        loop {
            let mut raw = Mat::default();
            if !self.video_capture.read(&mut raw)? || raw.empty() {
                if matches!(self.video_source, VideoSource::File(_)) {
                    info!("End of video file reached");
                    break;
                }
                warn!("Failed to read frame, retrying...");
                continue;
            }

            let display = &self.config.display;
            let frame = orient_frame(&raw, display.rotate_camera, display.mirror)?;

            if display.enabled {
                self.config.joystick = read_trackbars(&display.window_name)?.to_config(self.trackbar_ranges);
            }

            let report = match self.pipeline.process(&frame, &self.config.joystick) {
                Ok(report) => report,
                Err(e) => {
                    warn!("Skipping frame {frame_count}: {e}");
                    continue;
                }
            };

            frame_count += 1;
            if last_fps_update.elapsed() >= Duration::from_secs(1) {
                #[allow(clippy::cast_precision_loss)]
                let frames = frame_count as f64;
                fps = frames / start_time.elapsed().as_secs_f64();
                last_fps_update = Instant::now();
                debug!("{fps:.1} fps, phase {}", report.outcome.phase);
            }

            if self.config.display.enabled {
                let mut canvas = frame.try_clone()?;
                if self.config.display.blur_face {
                    if let Some(face) = report.outcome.face {
                        blur_region(&mut canvas, face)?;
                    }
                }
                draw_overlay(&mut canvas, &report, self.pipeline.reference(), &self.config.joystick, fps)?;
                highgui::imshow(&self.config.display.window_name, &canvas)?;

                let action = KeyAction::from_key(highgui::wait_key(1)?);
                if !self.pipeline.handle_key(action) {
                    break;
                }
            }
        }

        info!("Application shutting down after {frame_count} frames");
        self.pipeline.release()?;
        if self.config.display.enabled {
            highgui::destroy_all_windows()?;
        }
        Ok(())
    }
}

/// Create the display window with its joystick trackbars
fn create_window(display: &DisplayConfig, joystick: &JoystickConfig, ranges: TrackbarRanges) -> Result<()> {
    let window = display.window_name.as_str();
    highgui::named_window(window, WINDOW_NORMAL)?;
    if display.fullscreen {
        highgui::set_window_property(window, WND_PROP_FULLSCREEN, f64::from(WINDOW_FULLSCREEN))?;
    }

    let adjusted = trackbar_adjusted_settings(joystick, ranges);
    if !adjusted.is_empty() {
        warn!("Trackbars cannot show {} exactly; the slider values replace them", adjusted.join(", "));
    }

    let initial = TrackbarPositions::from_config(joystick, ranges);
    let trackbars = [
        (TRACKBAR_DEADZONE_X, ranges.deadzone_max, initial.deadzone_x),
        (TRACKBAR_DEADZONE_Y, ranges.deadzone_max, initial.deadzone_y),
        (TRACKBAR_SENSITIVITY_X, ranges.sensitivity_max, initial.sensitivity_x),
        (TRACKBAR_SENSITIVITY_Y, ranges.sensitivity_max, initial.sensitivity_y),
        (TRACKBAR_SMOOTHING, SMOOTHING_TRACKBAR_MAX, initial.smoothing_percent),
    ];
    for (name, max, position) in trackbars {
        highgui::create_trackbar(name, window, None, max, None)?;
        highgui::set_trackbar_pos(name, window, position)?;
    }
    highgui::set_trackbar_min(TRACKBAR_SMOOTHING, window, 1)?;
    Ok(())
}

/// Poll the trackbars; values changed by the user apply from this frame on
fn read_trackbars(window: &str) -> Result<TrackbarPositions> {
    Ok(TrackbarPositions {
        deadzone_x: highgui::get_trackbar_pos(TRACKBAR_DEADZONE_X, window)?,
        deadzone_y: highgui::get_trackbar_pos(TRACKBAR_DEADZONE_Y, window)?,
        sensitivity_x: highgui::get_trackbar_pos(TRACKBAR_SENSITIVITY_X, window)?,
        sensitivity_y: highgui::get_trackbar_pos(TRACKBAR_SENSITIVITY_Y, window)?,
        smoothing_percent: highgui::get_trackbar_pos(TRACKBAR_SMOOTHING, window)?,
    })
}

/// Blur the part of `face` that lies inside the frame
fn blur_region(frame: &mut Mat, face: BoundingBox) -> Result<()> {
    let (width, height) = frame_size(frame);
    let Some(region) = face.clip_to(width, height) else {
        return Ok(());
    };
    let rect = Rect::from(region);

    let mut blurred = Mat::default();
    {
        let roi = Mat::roi(frame, rect)?;
        imgproc::gaussian_blur(
            &roi,
            &mut blurred,
            Size::new(FACE_BLUR_KERNEL, FACE_BLUR_KERNEL),
            FACE_BLUR_SIGMA,
            0.0,
            BORDER_DEFAULT,
        )?;
    }
    let mut target = frame.roi_mut(rect)?;
    blurred.copy_to(&mut target)?;
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn to_pixel(value: f64) -> i32 {
    value.round() as i32
}

/// Draw the face box, its centre, the reference point and the current values
fn draw_overlay(
    frame: &mut Mat,
    report: &FrameReport,
    reference: Option<(f64, f64)>,
    joystick: &JoystickConfig,
    fps: f64,
) -> Result<()> {
    let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
    let yellow = Scalar::new(0.0, 255.0, 255.0, 0.0);
    let red = Scalar::new(0.0, 0.0, 255.0, 0.0);
    let blue = Scalar::new(255.0, 0.0, 0.0, 0.0);
    let white = Scalar::new(255.0, 255.0, 255.0, 0.0);

    let outcome = &report.outcome;
    if let Some(face) = outcome.face {
        let color = if outcome.is_fresh() { green } else { yellow };
        imgproc::rectangle(frame, Rect::from(face), color, 2, LINE_8, 0)?;
        let center = face.center();
        imgproc::circle(
            frame,
            Point::new(to_pixel(f64::from(center.x)), to_pixel(f64::from(center.y))),
            4,
            color,
            -1,
            LINE_8,
            0,
        )?;
    } else {
        imgproc::put_text(
            frame,
            "NO FACE",
            Point::new(10, 90),
            FONT_HERSHEY_SIMPLEX,
            1.0,
            red,
            2,
            LINE_8,
            false,
        )?;
    }

    if let Some((x, y)) = reference {
        imgproc::circle(frame, Point::new(to_pixel(x), to_pixel(y)), 6, blue, 2, LINE_8, 0)?;
    }

    let lines = [
        format!("FPS: {fps:.1}  {}", outcome.phase),
        format!("Joystick X: {:+.2}  Y: {:+.2}", report.output.x, report.output.y),
        format!(
            "Deadzone {:.0}/{:.0}  Sensitivity {:.0}/{:.0}",
            joystick.deadzone_x, joystick.deadzone_y, joystick.sensitivity_x, joystick.sensitivity_y
        ),
    ];
    let text_rows = [30, 60, frame.rows() - 15];
    for (line, y) in lines.iter().zip(text_rows) {
        imgproc::put_text(frame, line, Point::new(10, y), FONT_HERSHEY_SIMPLEX, 0.7, white, 2, LINE_8, false)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_actions() {
        assert_eq!(KeyAction::from_key(-1), KeyAction::None);
        assert_eq!(KeyAction::from_key(KEY_ESCAPE), KeyAction::Quit);
        assert_eq!(KeyAction::from_key(i32::from(b'q')), KeyAction::Quit);
        assert_eq!(KeyAction::from_key(i32::from(b'r')), KeyAction::ResetReference);
        assert_eq!(KeyAction::from_key(i32::from(b't')), KeyAction::ResetTracking);
        assert_eq!(KeyAction::from_key(i32::from(b'x')), KeyAction::None);
    }

    #[test]
    fn test_trackbars_map_to_joystick_config() {
        let positions = TrackbarPositions {
            deadzone_x: 25,
            deadzone_y: 10,
            sensitivity_x: 4,
            sensitivity_y: 6,
            smoothing_percent: 50,
        };
        let config = positions.to_config(TrackbarRanges::default());
        assert_eq!(config.deadzone_x, 25.0);
        assert_eq!(config.deadzone_y, 10.0);
        assert_eq!(config.sensitivity_x, 4.0);
        assert_eq!(config.sensitivity_y, 6.0);
        assert_eq!(config.smoothing_factor, 0.5);
        config.validate().unwrap();
    }

    #[test]
    fn test_smoothing_trackbar_never_reaches_zero() {
        let zeros = TrackbarPositions {
            deadzone_x: 0,
            deadzone_y: 0,
            sensitivity_x: 0,
            sensitivity_y: 0,
            smoothing_percent: 0,
        };
        assert_eq!(zeros.to_config(TrackbarRanges::default()).smoothing_factor, 0.01);
    }

    #[test]
    fn test_default_config_round_trips_through_trackbars() {
        let defaults = JoystickConfig::default();
        let ranges = TrackbarRanges::for_config(&defaults);
        assert_eq!(ranges, TrackbarRanges::default());
        let positions = TrackbarPositions::from_config(&defaults, ranges);
        assert_eq!(positions.deadzone_x, 20);
        assert_eq!(positions.smoothing_percent, 100);
        assert_eq!(positions.to_config(ranges), defaults);
        assert!(trackbar_adjusted_settings(&defaults, ranges).is_empty());
        assert_eq!(trackbar_position(f64::NAN, 10), 0);
        assert_eq!(trackbar_position(500.0, 20), 20);
    }

    #[test]
    fn test_trackbar_ranges_widen_to_fit_config() {
        let config = JoystickConfig {
            deadzone_y: 150.0,
            sensitivity_x: 30.0,
            ..JoystickConfig::default()
        };
        let ranges = TrackbarRanges::for_config(&config);
        assert_eq!(ranges.deadzone_max, 150);
        assert_eq!(ranges.sensitivity_max, 30);

        let shown = TrackbarPositions::from_config(&config, ranges).to_config(ranges);
        assert_eq!(shown, config);
        assert!(trackbar_adjusted_settings(&config, ranges).is_empty());
    }

    #[test]
    fn test_fractional_settings_are_reported() {
        let config = JoystickConfig {
            deadzone_x: 12.5,
            smoothing_factor: 0.333,
            ..JoystickConfig::default()
        };
        let ranges = TrackbarRanges::for_config(&config);
        assert_eq!(ranges, TrackbarRanges::default());
        assert_eq!(
            trackbar_adjusted_settings(&config, ranges),
            vec!["deadzone_x", "smoothing_factor"]
        );
    }

    #[test]
    fn test_blur_region_stays_inside_frame() {
        let mut frame = Mat::new_rows_cols_with_default(60, 80, opencv::core::CV_8UC3, Scalar::all(0.0)).unwrap();
        imgproc::rectangle(&mut frame, Rect::new(40, 0, 40, 60), Scalar::all(255.0), -1, LINE_8, 0).unwrap();
        let before = *frame.at_2d::<opencv::core::Vec3b>(30, 40).unwrap();

        blur_region(&mut frame, BoundingBox::new(20, 10, 500, 500)).unwrap();
        blur_region(&mut frame, BoundingBox::new(100, 100, 10, 10)).unwrap();

        assert_eq!(frame_size(&frame), (80, 60));
        let after = *frame.at_2d::<opencv::core::Vec3b>(30, 40).unwrap();
        assert!(after[0] < before[0]);
        assert_eq!(*frame.at_2d::<opencv::core::Vec3b>(5, 5).unwrap(), opencv::core::Vec3b::all(0));
    }
}
