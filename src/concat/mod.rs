//! Unit concatenation: turn a list of selected units into one audio stream.
//!
//! Every request runs three phases in order. *Retrieve* fetches each unit's datagrams from the
//! timeline, *realize* settles the frames to render, and *generate* decodes them into an
//! [`AudioStream`]. The [`Strategy`] picked for the request decides how each phase behaves:
//!
//! | Strategy    | Retrieve                      | Realize              | Generate                         |
//! |-------------|-------------------------------|----------------------|----------------------------------|
//! | `Base`      | unit datagrams                | silence + pitchmarks | flat decode                      |
//! | `Overlap`   | unit datagrams + right context| silence + pitchmarks | overlap-add decode               |
//! | `PitchSync` | edge guard, then as `Overlap` | nothing              | silence, [`Resynthesizer`]       |

mod base;
mod data;
mod overlap;
mod pitch_sync;
mod resynth;

pub use data::{ConcatTable, ConcatenationData};
pub use pitch_sync::{PitchSync, ScaleLimits};
pub use resynth::{PeriodResynthesizer, PitchSyncInput, Resynthesizer};

use std::fmt;

use tracing::{debug, info};

use crate::audio::{AudioFormat, AudioStream};
use crate::corpus::{DatagramStore, SelectedUnit, Unit, UnitDatabase};
use crate::error::Result;

/// How units are joined.
#[derive(Debug)]
pub enum Strategy {
    /// Plain back-to-back concatenation.
    Base,
    /// Cross-fade each join with the previous unit's natural continuation.
    Overlap,
    /// Pitch-synchronous resynthesis towards the target durations.
    PitchSync(PitchSync),
}

impl Strategy {
    /// Pitch-synchronous strategy with the default engine.
    pub fn pitch_sync(limits: ScaleLimits) -> Self {
        Self::PitchSync(PitchSync::new(limits))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Overlap => write!(f, "overlap"),
            Self::PitchSync(_) => write!(f, "pitch-sync"),
        }
    }
}

/// Joins selected units from one voice into audio.
///
/// Holds read-only views of the timeline and the unit database; a single concatenator can
/// serve any number of sequential requests.
pub struct UnitConcatenator<'a> {
    timeline: &'a dyn DatagramStore,
    database: &'a dyn UnitDatabase,
    strategy: Strategy,
    format: AudioFormat,
    unit_to_timeline: f64, // Timeline rate / unit index rate
}

impl<'a> UnitConcatenator<'a> {
    /// Create a concatenator over a voice's timeline and unit database.
    ///
    /// # Arguments
    /// * `timeline` - Store the audio is fetched from; its rate is the output rate
    /// * `database` - Unit ordering, used to find each unit's natural successor
    /// * `strategy` - How units are joined
    pub fn new(timeline: &'a dyn DatagramStore, database: &'a dyn UnitDatabase, strategy: Strategy) -> Self {
        let format = AudioFormat::pcm16_mono(timeline.sample_rate());
        let unit_to_timeline = timeline.sample_rate() as f64 / database.unit_sample_rate() as f64;
        info!(
            "Unit concatenator ready: {} strategy, timeline {} Hz, units {} Hz",
            strategy,
            timeline.sample_rate(),
            database.unit_sample_rate()
        );
        Self { timeline, database, strategy, format, unit_to_timeline }
    }

    /// Format of every stream this concatenator produces.
    pub fn audio_format(&self) -> AudioFormat {
        self.format
    }

    /// Produce the audio for a selected unit sequence.
    ///
    /// # Arguments
    /// * `units` - Selected units in playback order
    ///
    /// # Returns
    /// A lazily decoded stream in [`Self::audio_format`]
    ///
    /// # Errors
    /// Corpus I/O failures, or a contract violation such as an edge unit in the selection;
    /// either way no audio is produced.
    pub fn synthesize(&self, units: &[SelectedUnit]) -> Result<AudioStream> {
        info!("Getting audio for {} units", units.len());
        let mut table = self.retrieve(units)?;
        self.realize(units, &mut table);
        let stream = self.generate(units, table)?;
        debug!("Generated stream of {} samples", stream.frame_length());
        Ok(stream)
    }

    /// Retrieve phase: fetch the corpus audio for every unit.
    pub fn retrieve(&self, units: &[SelectedUnit]) -> Result<ConcatTable> {
        let table = match &self.strategy {
            Strategy::Base => base::retrieve(self, units)?,
            Strategy::Overlap => overlap::retrieve(self, units)?,
            Strategy::PitchSync(_) => pitch_sync::retrieve(self, units)?,
        };
        debug!("Retrieved {} frames for {} units", table.iter().map(|d| d.frames().len()).sum::<usize>(), units.len());
        Ok(table)
    }

    /// Realize phase: settle the frames to render.
    pub fn realize(&self, units: &[SelectedUnit], table: &mut ConcatTable) {
        match &self.strategy {
            Strategy::Base | Strategy::Overlap => base::realize(self, units, table),
            Strategy::PitchSync(_) => {} // the engine resolves target pitchmarks itself
        }
    }

    /// Generate phase: decode the realized frames into a stream.
    ///
    /// # Errors
    /// Returns `Error::MissingConcatenationData` if `table` has no entry for some unit.
    pub fn generate(&self, units: &[SelectedUnit], table: ConcatTable) -> Result<AudioStream> {
        match &self.strategy {
            Strategy::Base => base::generate(self, units, table),
            Strategy::Overlap => overlap::generate(self, units, table),
            Strategy::PitchSync(sync) => pitch_sync::generate(self, sync, units, table),
        }
    }

    /// Start and length of a unit in timeline samples.
    fn timeline_span(&self, unit: &Unit) -> (i64, i64) {
        (self.to_timeline(unit.start), self.to_timeline(unit.duration as i64))
    }

    fn to_timeline(&self, unit_samples: i64) -> i64 {
        (unit_samples as f64 * self.unit_to_timeline) as i64
    }
}
