//! Error types for the room-core crate.
//!
//! Only configuration problems and FFT planner failures are errors. Invalid
//! geometry and degenerate reverberation times are recovered where they occur.

use thiserror::Error;

/// Error type for room-core operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RoomError {
    /// No band centre frequencies were supplied.
    #[error("bands must contain at least one centre frequency")]
    EmptyBands,

    /// A band centre frequency is zero.
    #[error("invalid band centre frequency: {band} Hz")]
    InvalidBand {
        /// The offending band.
        band: u32,
    },

    /// Modal frequency ceiling is not a positive finite number.
    #[error("fmax_hz must be positive and finite, got {fmax_hz}")]
    InvalidMaxFrequency {
        /// The rejected ceiling.
        fmax_hz: f64,
    },

    /// Requested mode count is outside `1..=max`.
    #[error("modes_top_n must be in 1..={max}, got {top_n}")]
    InvalidModeCount {
        /// Requested count.
        top_n: usize,
        /// Largest accepted count.
        max: usize,
    },

    /// IR length is not in `(0, max]` seconds or rounds to zero samples.
    #[error("ir_length_sec must be in (0, {max}] and yield at least one sample, got {seconds}")]
    InvalidIrLength {
        /// Requested length in seconds.
        seconds: f64,
        /// Longest accepted length in seconds.
        max: f64,
    },

    /// Sample rate outside the supported range.
    #[error("sample_rate_hz must be in {min}..={max}, got {sample_rate_hz}")]
    InvalidSampleRate {
        /// Requested rate.
        sample_rate_hz: u32,
        /// Lowest accepted rate.
        min: u32,
        /// Highest accepted rate.
        max: u32,
    },

    /// The real FFT rejected its input or output buffers.
    #[error("FFT failed: {0}")]
    Fft(String),
}

impl From<realfft::FftError> for RoomError {
    fn from(err: realfft::FftError) -> Self {
        RoomError::Fft(err.to_string())
    }
}

/// Result alias for room-core operations.
pub type Result<T> = std::result::Result<T, RoomError>;
