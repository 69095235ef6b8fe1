//! Output sinks for joystick values.
//!
//! The default sink drives the X11 pointer in velocity mode: each frame the
//! cursor moves by the joystick deflection times a speed factor. Other sinks
//! only log or discard values, which is useful for headless runs and testing.

use crate::joystick::JoystickValue;
use crate::utils::f64_to_i16_saturating;
use crate::{Error, Result};
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use x11rb::{
    connection::Connection,
    protocol::xproto::{ConnectionExt, Screen},
    rust_connection::RustConnection,
};

/// Receives the smoothed joystick value once per frame
pub trait OutputSink {
    /// Deliver one value
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] if the device rejects the value.
    fn send(&mut self, value: JoystickValue) -> Result<()>;

    /// Return the device to neutral before shutdown
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] if the device cannot be reset.
    fn release(&mut self) -> Result<()> {
        Ok(())
    }

    /// Sink name for diagnostics
    fn name(&self) -> &str;
}

/// Which sink to build
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Move the X11 pointer
    #[default]
    Cursor,
    /// Log values at info level
    Log,
    /// Discard values
    None,
}

impl FromStr for OutputMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cursor" => Ok(Self::Cursor),
            "log" => Ok(Self::Log),
            "none" => Ok(Self::None),
            other => Err(Error::ConfigError(format!(
                "Unknown output mode '{other}', expected cursor, log or none"
            ))),
        }
    }
}

/// Build the sink for `mode`
///
/// # Errors
///
/// Returns [`Error::Output`] if the cursor sink cannot reach the X server.
pub fn create_sink(mode: OutputMode, cursor_speed: f64) -> Result<Box<dyn OutputSink>> {
    Ok(match mode {
        OutputMode::Cursor => Box::new(CursorSink::connect(cursor_speed)?),
        OutputMode::Log => Box::new(LogSink::default()),
        OutputMode::None => Box::new(NullSink),
    })
}

/// Pixel step for one frame at full deflection `speed`. Screen `y` grows downward.
#[must_use]
pub fn velocity_step(value: JoystickValue, speed: f64) -> (i16, i16) {
    (
        f64_to_i16_saturating(value.x * speed),
        f64_to_i16_saturating(-value.y * speed),
    )
}

/// Velocity-mode pointer control over X11
pub struct CursorSink {
    connection: RustConnection,
    screen: Screen,
    speed: f64,
}

impl CursorSink {
    /// Connect to the default display
    ///
    /// # Errors
    ///
    /// Returns [`Error::Output`] when no X server is reachable.
    pub fn connect(speed: f64) -> Result<Self> {
        info!("Connecting to X11 for pointer output");

        let (connection, screen_num) = RustConnection::connect(None)
            .map_err(|e| Error::Output(format!("Failed to connect to X11: {e}")))?;
        let screen = connection
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| Error::Output("X11 display has no screen".to_string()))?
            .clone();

        info!(
            "Pointer output on {}x{} screen, speed {speed}",
            screen.width_in_pixels, screen.height_in_pixels
        );

        Ok(Self {
            connection,
            screen,
            speed,
        })
    }

    fn pointer_position(&self) -> Result<(i16, i16)> {
        let reply = self
            .connection
            .query_pointer(self.screen.root)
            .map_err(|e| Error::Output(format!("Failed to send query pointer: {e}")))?
            .reply()
            .map_err(|e| Error::Output(format!("Failed to query pointer: {e}")))?;
        Ok((reply.root_x, reply.root_y))
    }

    fn warp_to(&self, x: i16, y: i16) -> Result<()> {
        let max_x = i16::try_from(self.screen.width_in_pixels.saturating_sub(1)).unwrap_or(i16::MAX);
        let max_y = i16::try_from(self.screen.height_in_pixels.saturating_sub(1)).unwrap_or(i16::MAX);
        let (x, y) = (x.clamp(0, max_x), y.clamp(0, max_y));

        self.connection
            .warp_pointer(x11rb::NONE, self.screen.root, 0, 0, 0, 0, x, y)
            .map_err(|e| Error::Output(format!("Failed to warp pointer: {e}")))?;
        self.connection
            .flush()
            .map_err(|e| Error::Output(format!("Failed to flush connection: {e}")))?;
        Ok(())
    }
}

impl OutputSink for CursorSink {
    fn send(&mut self, value: JoystickValue) -> Result<()> {
        let (dx, dy) = velocity_step(value, self.speed);
        if dx == 0 && dy == 0 {
            return Ok(());
        }
        let (x, y) = self.pointer_position()?;
        trace!("Pointer step ({dx}, {dy}) from ({x}, {y})");
        self.warp_to(x.saturating_add(dx), y.saturating_add(dy))
    }

    fn release(&mut self) -> Result<()> {
        // velocity output has nothing latched; just make sure requests went out
        self.connection
            .flush()
            .map_err(|e| Error::Output(format!("Failed to flush connection: {e}")))?;
        Ok(())
    }

    fn name(&self) -> &str {
        "cursor"
    }
}

/// Logs every value that differs from the last one logged
#[derive(Debug, Default)]
pub struct LogSink {
    last: Option<JoystickValue>,
}

impl OutputSink for LogSink {
    fn send(&mut self, value: JoystickValue) -> Result<()> {
        if self.last != Some(value) {
            info!("Joystick x={:+.3} y={:+.3}", value.x, value.y);
            self.last = Some(value);
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        debug!("Log output released");
        self.last = None;
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Discards every value
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn send(&mut self, _value: JoystickValue) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "none"
    }
}
