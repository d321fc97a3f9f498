//! Unit Concatenator - the audio-assembly stage of a unit-selection speech synthesizer.
//!
//! Takes the units chosen by unit selection, fetches their audio from the voice corpus,
//! joins them with one of several concatenation strategies and produces a lazily decoded
//! PCM stream.

pub mod audio;
pub mod concat;
pub mod config;
pub mod corpus;
pub mod error;

pub use concat::{Strategy, UnitConcatenator};
pub use error::{Error, Result};
