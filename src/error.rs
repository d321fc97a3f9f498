//! Error types for the concatenation pipeline.

use thiserror::Error;

/// Result alias used across the library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while assembling audio from selected units.
///
/// Apart from `Io`, `Json`, `Wav` and `Resample`, every variant marks a broken contract with
/// the upstream selection or corpus-building stage. They abort the request; no partial
/// audio is ever returned.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading the voice corpus failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A unit index or request file could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Datagram payload does not hold exactly two bytes per declared sample.
    #[error("datagram payload is {actual} bytes, expected {expected} (2 per sample)")]
    PayloadLength { expected: usize, actual: usize },

    /// An edge unit reached the concatenator as if it were speakable.
    #[error("selected unit {index} is an edge unit")]
    EdgeUnitSelected { index: usize },

    /// The generate phase ran without concatenation data for a unit.
    #[error("no concatenation data for selected unit {index}")]
    MissingConcatenationData { index: usize },

    /// A request referenced a unit the database does not contain.
    #[error("unknown unit index {index}")]
    UnknownUnit { index: usize },

    /// The timeline file is malformed.
    #[error("invalid timeline: {0}")]
    InvalidTimeline(String),

    /// Writing the output WAV file failed.
    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    /// Resampling the output waveform failed.
    #[error("resampling error: {0}")]
    Resample(String),
}
