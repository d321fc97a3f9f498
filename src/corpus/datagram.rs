//! Datagrams: the corpus's audio granules.
//!
//! A datagram pairs a duration in samples with its raw 16-bit big-endian PCM payload.

use std::io::{self, Read, Write};
use std::sync::Arc;

use crate::error::{Error, Result};

/// Bytes per 16-bit mono sample.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Immutable binary record of `duration` samples.
///
/// The payload is shared, so cloning a datagram (e.g. to reuse it as a right context
/// or to duplicate a pitch period) never copies audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    duration: u32,
    data: Arc<[u8]>,
}

impl Datagram {
    /// Create a datagram from a payload of exactly `2 * duration` bytes.
    ///
    /// # Errors
    /// Returns `Error::PayloadLength` if the payload size disagrees with the duration.
    pub fn new(duration: u32, data: impl Into<Arc<[u8]>>) -> Result<Self> {
        let data = data.into();
        let expected = duration as usize * BYTES_PER_SAMPLE;
        if data.len() != expected {
            return Err(Error::PayloadLength { expected, actual: data.len() });
        }
        Ok(Self { duration, data })
    }

    /// All-zero datagram of `duration` samples.
    pub fn silence(duration: u32) -> Self {
        Self { duration, data: vec![0u8; duration as usize * BYTES_PER_SAMPLE].into() }
    }

    /// Encode signed 16-bit samples as a big-endian datagram.
    pub fn from_samples(samples: &[i16]) -> Self {
        let data: Vec<u8> = samples.iter().flat_map(|s| s.to_be_bytes()).collect();
        Self { duration: samples.len() as u32, data: data.into() }
    }

    /// The same samples in reverse order.
    pub fn reversed(&self) -> Self {
        let data: Vec<u8> = self.data.chunks_exact(BYTES_PER_SAMPLE).rev().flatten().copied().collect();
        Self { duration: self.duration, data: data.into() }
    }

    /// Duration in samples.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Raw big-endian PCM payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Decode the payload into normalized samples in [-1, 1), appending to `out`.
    pub fn decode_into(&self, out: &mut Vec<f64>) {
        out.reserve(self.duration as usize);
        out.extend(self.data.chunks_exact(BYTES_PER_SAMPLE).map(|b| i16::from_be_bytes([b[0], b[1]]) as f64 / 32768.0));
    }

    /// Decode the payload into a fresh vector.
    pub fn decode(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.duration as usize);
        self.decode_into(&mut out);
        out
    }

    /// Read one datagram in its binary shape: `duration: u32` (big-endian) then the payload.
    ///
    /// # Errors
    /// Returns an `UnexpectedEof` I/O error if the payload is shorter than declared.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut header = [0u8; 4];
        reader.read_exact(&mut header)?;
        let duration = u32::from_be_bytes(header);
        let expected = duration as usize * BYTES_PER_SAMPLE;

        // The declared duration is untrusted: let the payload grow with what is actually there
        let mut data = Vec::new();
        reader.by_ref().take(expected as u64).read_to_end(&mut data)?;
        if data.len() != expected {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, format!("datagram payload truncated: {} of {} bytes", data.len(), expected)).into());
        }
        Self::new(duration, data)
    }

    /// Write the datagram in its binary shape.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.duration.to_be_bytes())?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}
