//! Frame pipeline: tracking feeding the joystick mapper and output sink


use face_joystick::{
    app::{FacePipeline, KeyAction},
    geometry::BoundingBox,
    joystick::{JoystickConfig, JoystickValue},
    output::OutputSink,
    tracking::TrackingPhase,
    Error, Result,
};
use opencv::core::{Mat, Point2f};
use std::cell::RefCell;
use std::rc::Rc;
use test_helpers::{blank_frame, controller, ScriptedCascade, ScriptedMotion, ScriptedPrimary};

#[derive(Default)]
struct RecordingSink {
    sent: Rc<RefCell<Vec<JoystickValue>>>,
    released: Rc<RefCell<bool>>,
    fail: bool,
}

impl OutputSink for RecordingSink {
    fn send(&mut self, value: JoystickValue) -> Result<()> {
        self.sent.borrow_mut().push(value);
        if self.fail {
            return Err(Error::Output("device gone".to_string()));
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        *self.released.borrow_mut() = true;
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

fn unit_joystick() -> JoystickConfig {
    JoystickConfig {
        deadzone_x: 0.0,
        deadzone_y: 0.0,
        sensitivity_x: 1.0,
        sensitivity_y: 1.0,
        smoothing_factor: 1.0,
    }
}

#[test]
fn test_face_motion_drives_output() {
    // face centre starts at (320, 240) and moves 32 px right per frame
    let primary = ScriptedPrimary::new(|_| vec![BoundingBox::new(270, 190, 100, 100)]);
    let motion = ScriptedMotion::new(|_, points| points.iter().map(|p| Point2f::new(p.x + 32.0, p.y)).collect());
    let sink = RecordingSink::default();
    let sent = Rc::clone(&sink.sent);
    let mut pipeline = FacePipeline::new(
        controller(primary, ScriptedCascade::empty(), motion),
        Box::new(sink),
    );
    let frame = blank_frame(640, 480);
    let joystick = unit_joystick();

    let first = pipeline.process(&frame, &joystick).unwrap();
    assert_eq!(first.output, JoystickValue::default());
    assert_eq!(pipeline.reference(), Some((320.0, 240.0)));

    let second = pipeline.process(&frame, &joystick).unwrap();
    assert_eq!(second.outcome.phase, TrackingPhase::Tracking);
    assert!((second.output.x - 0.1).abs() < 1e-6);
    assert_eq!(second.output.y, 0.0);

    assert_eq!(sent.borrow().len(), 2);
}

#[test]
fn test_no_face_sends_neutral_and_keeps_reference_unset() {
    let sink = RecordingSink::default();
    let sent = Rc::clone(&sink.sent);
    let mut pipeline = FacePipeline::new(
        controller(ScriptedPrimary::empty(), ScriptedCascade::empty(), ScriptedMotion::lost()),
        Box::new(sink),
    );

    let report = pipeline.process(&blank_frame(320, 240), &unit_joystick()).unwrap();

    assert!(report.sample.is_none());
    assert_eq!(report.output, JoystickValue::default());
    assert_eq!(pipeline.reference(), None);
    assert_eq!(*sent.borrow(), vec![JoystickValue::default()]);
}

#[test]
fn test_output_failure_does_not_stop_processing() {
    let sink = RecordingSink {
        fail: true,
        ..RecordingSink::default()
    };
    let sent = Rc::clone(&sink.sent);
    let mut pipeline = FacePipeline::new(
        controller(ScriptedPrimary::empty(), ScriptedCascade::empty(), ScriptedMotion::lost()),
        Box::new(sink),
    );
    let frame = blank_frame(320, 240);

    assert!(pipeline.process(&frame, &unit_joystick()).is_ok());
    assert!(pipeline.process(&frame, &unit_joystick()).is_ok());
    assert_eq!(sent.borrow().len(), 2);
}

#[test]
fn test_invalid_frame_is_reported_and_not_sent() {
    let sink = RecordingSink::default();
    let sent = Rc::clone(&sink.sent);
    let mut pipeline = FacePipeline::new(
        controller(ScriptedPrimary::empty(), ScriptedCascade::empty(), ScriptedMotion::lost()),
        Box::new(sink),
    );

    assert!(pipeline.process(&Mat::default(), &unit_joystick()).is_err());
    assert!(sent.borrow().is_empty());
}

#[test]
fn test_keys_reset_reference_tracking_and_quit() {
    let primary = ScriptedPrimary::new(|_| vec![BoundingBox::new(270, 190, 100, 100)]);
    let primary_calls = primary.calls();
    let sink = RecordingSink::default();
    let released = Rc::clone(&sink.released);
    let mut pipeline = FacePipeline::new(
        controller(primary, ScriptedCascade::empty(), ScriptedMotion::still()),
        Box::new(sink),
    );
    let frame = blank_frame(640, 480);

    pipeline.process(&frame, &unit_joystick()).unwrap();
    assert!(pipeline.reference().is_some());

    assert!(pipeline.handle_key(KeyAction::ResetReference));
    assert_eq!(pipeline.reference(), None);
    assert_eq!(pipeline.phase(), TrackingPhase::Tracking);

    pipeline.process(&frame, &unit_joystick()).unwrap();
    assert_eq!(pipeline.reference(), Some((320.0, 240.0)));
    assert_eq!(primary_calls.get(), 1);

    assert!(pipeline.handle_key(KeyAction::ResetTracking));
    assert_eq!(pipeline.phase(), TrackingPhase::Searching);
    assert_eq!(pipeline.reference(), None);
    pipeline.process(&frame, &unit_joystick()).unwrap();
    assert_eq!(primary_calls.get(), 2);

    assert!(pipeline.handle_key(KeyAction::None));
    assert!(!pipeline.handle_key(KeyAction::Quit));

    pipeline.release().unwrap();
    assert!(*released.borrow());
}
