//! Error types for the face joystick library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime session or inference failed
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed frame or parameters, e.g. a frame with zero width
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A detector model or cascade could not be loaded
    #[error("Detector unavailable: {0}")]
    DetectorUnavailable(String),

    /// An output sink (virtual pointer, etc.) rejected a value
    #[error("Output error: {0}")]
    Output(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
