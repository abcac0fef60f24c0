//! Error types for the specmorph crate.

use thiserror::Error;

use crate::core::window::WindowType;

/// Errors returned by engine construction and the offline/file paths.
///
/// The real-time path never returns an error; numeric edge cases there are
/// clamped locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MorphError {
    /// Frame size must be a power of two within the supported range.
    #[error("invalid frame size: {0}. Must be a power of two between 16 and 65536.")]
    InvalidFrameSize(usize),
    /// Overlap factor must divide the frame size.
    #[error("invalid overlap factor {overlap} for frame size {frame_size}")]
    InvalidOverlap { overlap: usize, frame_size: usize },
    /// The squared window does not overlap-add to a constant at this overlap.
    #[error("{window:?} window is not flat under {overlap}x overlap; raise the overlap factor")]
    UnevenOverlap { window: WindowType, overlap: usize },
    /// Channel count must be at least 1.
    #[error("invalid channel count: {0}")]
    InvalidChannels(u16),
    /// Sample rate must be positive.
    #[error("invalid sample rate: {0}. Must be greater than 0.")]
    InvalidSampleRate(u32),
    /// Main and aux buffers disagree on sample rate.
    #[error("sample rate mismatch: main is {main} Hz, aux is {aux} Hz")]
    SampleRateMismatch { main: u32, aux: u32 },
    /// Input contains NaN or infinite samples.
    #[error("input contains non-finite samples")]
    NonFiniteInput,
    /// Invalid input data.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Invalid file contents or encoding.
    #[error("invalid format: {0}")]
    InvalidFormat(String),
    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl From<std::io::Error> for MorphError {
    fn from(err: std::io::Error) -> Self {
        MorphError::IoError(err.to_string())
    }
}

impl From<hound::Error> for MorphError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => MorphError::IoError(e.to_string()),
            other => MorphError::InvalidFormat(other.to_string()),
        }
    }
}
