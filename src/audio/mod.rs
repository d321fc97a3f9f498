//! Audio decoding and output.
//!
//! Datagrams are decoded lazily into normalized samples, either as one flat sequence or
//! as per-unit groups with overlap-add at unit joins, and exposed as an `AudioStream`.

mod buffer;
mod decoder;
mod overlap;
pub mod resampler;
mod stream;
pub mod wav;
pub mod window;

pub use buffer::SampleBuffer;
pub use decoder::SampleDecoder;
pub use overlap::OverlapSampleDecoder;
pub use stream::{AudioFormat, AudioStream, to_pcm16};

/// Pull-based source of normalized samples in [-1, 1].
pub trait SampleSource {
    /// Total number of samples the source produces, known up front.
    fn total_length(&self) -> u64;

    /// Whether any samples remain.
    fn has_more(&self) -> bool;

    /// Samples still to be read, computed without decoding anything.
    fn available(&self) -> u64;

    /// Read up to `out.len()` samples; returns 0 once the source is exhausted.
    fn read(&mut self, out: &mut [f64]) -> usize;
}
