//! Units of the voice corpus and the database that orders them.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};

/// Reference into the voice corpus, in the unit index's own sample rate.
#[derive(Debug, Clone, Copy)]
pub struct Unit {
    pub index: usize,  // Position in the unit index
    pub start: i64,    // Start offset in unit-index samples
    pub duration: i32, // Duration in unit-index samples
    pub is_edge: bool, // Corpus/utterance boundary sentinel
}

/// Units compare by value: the same span of the corpus is the same unit.
impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.start == other.start && self.duration == other.duration
    }
}

impl Eq for Unit {}

/// Read access to the ordered units of a voice.
pub trait UnitDatabase {
    /// The unit that naturally follows `unit` in the corpus, if any.
    fn next_unit(&self, unit: &Unit) -> Option<Unit>;

    /// Sample rate in which unit offsets and durations are expressed.
    fn unit_sample_rate(&self) -> u32;
}

/// One entry of a unit index file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UnitRecord {
    pub start: i64,
    pub duration: i32,
    #[serde(default)]
    pub edge: bool,
}

/// On-disk shape of a unit index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitIndexFile {
    pub sample_rate: u32,
    pub units: Vec<UnitRecord>,
}

/// Unit database backed by an in-memory index.
#[derive(Debug, Clone)]
pub struct UnitIndex {
    sample_rate: u32,
    units: Vec<Unit>,
}

impl UnitIndex {
    /// Build an index from records in corpus order.
    pub fn new(sample_rate: u32, records: &[UnitRecord]) -> Self {
        let units = records
            .iter()
            .enumerate()
            .map(|(index, r)| Unit { index, start: r.start, duration: r.duration, is_edge: r.edge })
            .collect();
        Self { sample_rate, units }
    }

    /// Load a unit index from JSON.
    pub fn open(path: &Path) -> Result<Self> {
        let file: UnitIndexFile = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        let index = Self::new(file.sample_rate, &file.units);
        info!("Loaded unit index {} ({} units at {} Hz)", path.display(), index.len(), index.sample_rate);
        Ok(index)
    }

    /// Look up a unit by its index.
    ///
    /// # Errors
    /// Returns `Error::UnknownUnit` if no such unit exists.
    pub fn unit(&self, index: usize) -> Result<Unit> {
        self.units.get(index).copied().ok_or(Error::UnknownUnit { index })
    }

    /// Number of units, edge units included.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the index holds no units.
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl UnitDatabase for UnitIndex {
    fn next_unit(&self, unit: &Unit) -> Option<Unit> {
        self.units.get(unit.index + 1).copied()
    }

    fn unit_sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(start: i64, duration: i32, edge: bool) -> UnitRecord {
        UnitRecord { start, duration, edge }
    }

    #[test]
    fn test_next_unit_follows_corpus_order() {
        let index = UnitIndex::new(16000, &[record(0, 0, true), record(0, 50, false), record(50, 80, false)]);
        let first = index.unit(1).unwrap();
        assert_eq!(index.next_unit(&first), Some(index.unit(2).unwrap()));
        assert!(index.next_unit(&index.unit(2).unwrap()).is_none());
        assert!(matches!(index.unit(3), Err(Error::UnknownUnit { index: 3 })));
    }

    #[test]
    fn test_units_compare_by_span() {
        let a = Unit { index: 4, start: 100, duration: 20, is_edge: false };
        let b = Unit { index: 9, start: 100, duration: 20, is_edge: false };
        let c = Unit { index: 4, start: 100, duration: 21, is_edge: false };
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_parse_index_file() {
        let json = r#"{"sample_rate": 16000, "units": [{"start": 0, "duration": 0, "edge": true}, {"start": 0, "duration": 160}]}"#;
        let file: UnitIndexFile = serde_json::from_str(json).unwrap();
        let index = UnitIndex::new(file.sample_rate, &file.units);
        assert_eq!(index.len(), 2);
        assert!(index.unit(0).unwrap().is_edge);
        assert!(!index.unit(1).unwrap().is_edge);
        assert_eq!(index.unit_sample_rate(), 16000);
    }
}
