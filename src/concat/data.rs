//! Per-request concatenation state, kept in a side table parallel to the selected units.

use crate::corpus::Datagram;
use crate::error::{Error, Result};

/// Working state for one selected unit during one synthesis request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcatenationData {
    frames: Vec<Datagram>,
    unit_duration: u64,
    pitchmarks: Option<Vec<u64>>,
    right_context: Option<Datagram>,
}

impl ConcatenationData {
    pub fn new(frames: Vec<Datagram>) -> Self {
        let mut data = Self::default();
        data.set_frames(frames);
        data
    }

    /// Frames realized for the unit.
    pub fn frames(&self) -> &[Datagram] {
        &self.frames
    }

    /// Replace the frames; the realized duration follows.
    pub fn set_frames(&mut self, frames: Vec<Datagram>) {
        self.unit_duration = frames.iter().map(|dg| dg.duration() as u64).sum();
        self.frames = frames;
    }

    /// Realized duration of the unit in timeline samples.
    pub fn unit_duration(&self) -> u64 {
        self.unit_duration
    }

    /// Sample offsets, relative to the unit start, at which each frame ends.
    pub fn pitchmarks(&self) -> Option<&[u64]> {
        self.pitchmarks.as_deref()
    }

    pub fn set_pitchmarks(&mut self, pitchmarks: Vec<u64>) {
        self.pitchmarks = Some(pitchmarks);
    }

    /// Datagram following the unit in the corpus, kept for windowing only.
    pub fn right_context(&self) -> Option<&Datagram> {
        self.right_context.as_ref()
    }

    pub fn set_right_context(&mut self, right_context: Option<Datagram>) {
        self.right_context = right_context;
    }
}

/// Concatenation data for every selected unit, indexed by position in the selection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConcatTable {
    entries: Vec<ConcatenationData>,
}

impl ConcatTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { entries: Vec::with_capacity(capacity) }
    }

    pub fn push(&mut self, data: ConcatenationData) {
        self.entries.push(data);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Data for the unit at `index`.
    ///
    /// # Errors
    /// Returns `Error::MissingConcatenationData` if the retrieve phase never filled it.
    pub fn get(&self, index: usize) -> Result<&ConcatenationData> {
        self.entries.get(index).ok_or(Error::MissingConcatenationData { index })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConcatenationData> {
        self.entries.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ConcatenationData> {
        self.entries.iter_mut()
    }
}
