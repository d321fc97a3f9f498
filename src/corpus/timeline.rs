//! Timeline datagram store: random access to consecutive datagrams by sample offset.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info};

use super::datagram::Datagram;
use crate::error::{Error, Result};

/// Magic bytes opening a timeline file.
const TIMELINE_MAGIC: &[u8; 4] = b"UCTL";

/// Current timeline file version.
const TIMELINE_VERSION: u16 = 1;

/// Upper bound on datagram slots reserved from a file header before any datagram is read.
const MAX_PREALLOCATED_DATAGRAMS: usize = 1 << 16;

/// Read-only store of datagrams laid out on a sample timeline.
pub trait DatagramStore {
    /// Sample rate of the timeline.
    fn sample_rate(&self) -> u32;

    /// Datagrams covering `[start, start + length)`, beginning with the one that contains `start`.
    ///
    /// A negative length still yields the datagram at `start`.
    fn datagrams(&self, start: i64, length: i64) -> Result<Vec<Datagram>>;

    /// The datagram containing `position`, or `None` past the end of the timeline.
    fn datagram(&self, position: i64) -> Result<Option<Datagram>>;
}

/// Timeline held entirely in memory.
#[derive(Debug, Clone)]
pub struct MemoryTimeline {
    sample_rate: u32,
    datagrams: Vec<Datagram>,
    starts: Vec<u64>, // Start time of each datagram, ascending
    total: u64,       // Total duration in samples
}

impl MemoryTimeline {
    /// Create a timeline from datagrams laid end-to-end starting at time 0.
    pub fn new(sample_rate: u32, datagrams: Vec<Datagram>) -> Self {
        let mut starts = Vec::with_capacity(datagrams.len());
        let mut total = 0u64;
        for dg in &datagrams {
            starts.push(total);
            total += dg.duration() as u64;
        }
        Self { sample_rate, datagrams, starts, total }
    }

    /// Total duration in samples.
    pub fn total_duration(&self) -> u64 {
        self.total
    }

    /// Number of datagrams.
    pub fn len(&self) -> usize {
        self.datagrams.len()
    }

    /// Whether the timeline holds no datagrams.
    pub fn is_empty(&self) -> bool {
        self.datagrams.is_empty()
    }

    /// Index of the datagram containing `time`.
    ///
    /// Zero-length datagrams never contain a time point; the last datagram starting at or
    /// before `time` with a positive span wins.
    fn index_at(&self, time: u64) -> Option<usize> {
        if time >= self.total {
            return None;
        }
        let idx = self.starts.partition_point(|&s| s <= time);
        let mut idx = idx.checked_sub(1)?;
        while self.datagrams[idx].duration() == 0 {
            idx += 1;
        }
        Some(idx)
    }

    /// Load a timeline file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, has a bad header, or holds a
    /// datagram whose payload disagrees with its duration.
    pub fn open(path: &Path) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path)?);
        let timeline = Self::read_from(&mut reader)?;
        info!("Loaded timeline {} ({} datagrams, {} samples at {} Hz)", path.display(), timeline.len(), timeline.total, timeline.sample_rate);
        Ok(timeline)
    }

    /// Parse a timeline from its binary form.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if &magic != TIMELINE_MAGIC {
            return Err(Error::InvalidTimeline(format!("bad magic {:?}", magic)));
        }

        let mut version = [0u8; 2];
        reader.read_exact(&mut version)?;
        let version = u16::from_be_bytes(version);
        if version != TIMELINE_VERSION {
            return Err(Error::InvalidTimeline(format!("unsupported version {}", version)));
        }

        let mut word = [0u8; 4];
        reader.read_exact(&mut word)?;
        let sample_rate = u32::from_be_bytes(word);
        if sample_rate == 0 {
            return Err(Error::InvalidTimeline("sample rate is zero".to_string()));
        }
        reader.read_exact(&mut word)?;
        let count = u32::from_be_bytes(word) as usize;

        // The count is untrusted; datagrams that are really there grow the vector
        let mut datagrams = Vec::with_capacity(count.min(MAX_PREALLOCATED_DATAGRAMS));
        for _ in 0..count {
            datagrams.push(Datagram::read_from(reader)?);
        }
        debug!("Parsed {} datagrams at {} Hz", count, sample_rate);

        Ok(Self::new(sample_rate, datagrams))
    }

    /// Write the timeline in its binary form.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(TIMELINE_MAGIC)?;
        writer.write_all(&TIMELINE_VERSION.to_be_bytes())?;
        writer.write_all(&self.sample_rate.to_be_bytes())?;
        writer.write_all(&(self.datagrams.len() as u32).to_be_bytes())?;
        for dg in &self.datagrams {
            dg.write_to(writer)?;
        }
        Ok(())
    }

    /// Save the timeline to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

impl DatagramStore for MemoryTimeline {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn datagrams(&self, start: i64, length: i64) -> Result<Vec<Datagram>> {
        if start < 0 {
            return Err(Error::InvalidTimeline(format!("negative time position {}", start)));
        }
        let length = if length < 0 { 1 } else { length };
        let end = start as u64 + length as u64;

        let Some(first) = self.index_at(start as u64) else {
            return Ok(Vec::new());
        };

        let mut result = Vec::new();
        for idx in first..self.datagrams.len() {
            if self.starts[idx] >= end {
                break;
            }
            result.push(self.datagrams[idx].clone());
        }
        Ok(result)
    }

    fn datagram(&self, position: i64) -> Result<Option<Datagram>> {
        if position < 0 {
            return Err(Error::InvalidTimeline(format!("negative time position {}", position)));
        }
        Ok(self.index_at(position as u64).map(|idx| self.datagrams[idx].clone()))
    }
}
