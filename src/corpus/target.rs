//! Targets and selected units: the output of unit selection.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::phones::{self, PAUSE, PhoneClass};
use super::unit::{Unit, UnitIndex};
use crate::error::Result;

/// Target prosody for one selected unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub phone: String, // SAMPA symbol
    pub duration: f64, // Target duration in seconds
    #[serde(default)]
    pub f0: f64, // Target F0 in Hz (0 when unvoiced)
}

impl Target {
    /// Create a target.
    pub fn new(phone: impl Into<String>, duration: f64, f0: f64) -> Self {
        Self { phone: phone.into(), duration, f0 }
    }

    /// Whether the target is a pause.
    pub fn is_silence(&self) -> bool {
        self.phone == PAUSE
    }

    /// Whether frames realizing this target are voiced.
    pub fn is_voiced(&self) -> bool {
        phones::is_voiced(&self.phone)
    }

    /// Whether the target is a burst (plosive) whose duration must not be scaled.
    pub fn is_transient(&self) -> bool {
        phones::get_phone(&self.phone).is_some_and(|phone| phone.class == PhoneClass::Plosive)
    }

    /// Target duration in samples at `sample_rate`, rounded to the nearest sample.
    pub fn duration_in_samples(&self, sample_rate: u32) -> u32 {
        (self.duration * sample_rate as f64).round().max(0.0) as u32
    }
}

/// A corpus unit chosen to realize a target.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedUnit {
    pub unit: Unit,
    pub target: Target,
}

impl SelectedUnit {
    pub fn new(unit: Unit, target: Target) -> Self {
        Self { unit, target }
    }
}

/// One entry of a synthesis request file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestEntry {
    pub unit: usize,
    pub target: Target,
}

/// On-disk shape of a synthesis request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub units: Vec<RequestEntry>,
}

impl Request {
    /// Load a request from JSON.
    pub fn open(path: &Path) -> Result<Self> {
        let request: Request = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        info!("Loaded request {} ({} units)", path.display(), request.units.len());
        Ok(request)
    }

    /// Resolve unit indices against the unit index.
    pub fn resolve(&self, index: &UnitIndex) -> Result<Vec<SelectedUnit>> {
        self.units.iter().map(|entry| Ok(SelectedUnit::new(index.unit(entry.unit)?, entry.target.clone()))).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::unit::UnitRecord;
    use crate::error::Error;

    #[test]
    fn test_target_duration_rounds() {
        assert_eq!(Target::new("a", 0.005, 0.0).duration_in_samples(16000), 80);
        assert_eq!(Target::new("a", 0.00503, 0.0).duration_in_samples(16000), 80);
        assert_eq!(Target::new("a", 0.00504, 0.0).duration_in_samples(16000), 81);
    }

    #[test]
    fn test_silence() {
        assert!(Target::new("_", 0.1, 0.0).is_silence());
        assert!(!Target::new("a", 0.1, 0.0).is_silence());
    }

    #[test]
    fn test_transient() {
        assert!(Target::new("t", 0.1, 0.0).is_transient());
        assert!(Target::new("b", 0.1, 0.0).is_transient());
        assert!(!Target::new("s", 0.1, 0.0).is_transient());
        assert!(!Target::new("a", 0.1, 0.0).is_transient());
        assert!(!Target::new("unknown", 0.1, 0.0).is_transient());
    }

    #[test]
    fn test_resolve_request() {
        let index = UnitIndex::new(16000, &[UnitRecord { start: 0, duration: 100, edge: false }]);
        let json = r#"{"units": [{"unit": 0, "target": {"phone": "a", "duration": 0.1, "f0": 110.0}}]}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        let selected = request.resolve(&index).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].unit.duration, 100);
        assert_eq!(selected[0].target.f0, 110.0);

        let json = r#"{"units": [{"unit": 7, "target": {"phone": "a", "duration": 0.1}}]}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert!(matches!(request.resolve(&index), Err(Error::UnknownUnit { index: 7 })));
    }
}
