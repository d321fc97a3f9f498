//! Pitch-synchronous strategy: overlap retrieval with an edge-unit guard, and a generate phase
//! that prepares voicing, right contexts and scale factors for a [`Resynthesizer`].

use std::fmt;

use tracing::debug;

use super::UnitConcatenator;
use super::data::ConcatTable;
use super::{base, overlap};
use super::resynth::{PeriodResynthesizer, PitchSyncInput, Resynthesizer};
use crate::audio::AudioStream;
use crate::corpus::SelectedUnit;
use crate::error::{Error, Result};

/// Bounds applied to the scale factors handed to the resynthesis engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleLimits {
    pub min_time_scale: f64,
    pub max_time_scale: f64,
    pub min_pitch_scale: f64,
    pub max_pitch_scale: f64,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self { min_time_scale: 0.5, max_time_scale: 2.0, min_pitch_scale: 0.5, max_pitch_scale: 2.0 }
    }
}

/// Pitch-synchronous strategy state: scale bounds and the engine that renders the audio.
pub struct PitchSync {
    limits: ScaleLimits,
    engine: Box<dyn Resynthesizer>,
}

impl PitchSync {
    /// Strategy backed by the default [`PeriodResynthesizer`].
    pub fn new(limits: ScaleLimits) -> Self {
        Self::with_engine(limits, PeriodResynthesizer)
    }

    pub fn with_engine(limits: ScaleLimits, engine: impl Resynthesizer + 'static) -> Self {
        Self { limits, engine: Box::new(engine) }
    }

    /// Time scale that stretches `realized` samples to `target` samples, within limits.
    fn time_scale(&self, index: usize, target: f64, realized: u64) -> f64 {
        if realized == 0 {
            return 1.0;
        }
        let scale = target / realized as f64;
        let clipped = scale.clamp(self.limits.min_time_scale, self.limits.max_time_scale);
        if clipped != scale {
            debug!("Unit {}: time scale {:.3} clipped to {:.3}", index, scale, clipped);
        }
        clipped
    }

    fn pitch_scale(&self) -> f64 {
        1.0f64.clamp(self.limits.min_pitch_scale, self.limits.max_pitch_scale)
    }
}

impl fmt::Debug for PitchSync {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PitchSync").field("limits", &self.limits).finish_non_exhaustive()
    }
}

/// Reject edge units, then retrieve like the overlap strategy.
///
/// # Errors
/// Returns `Error::EdgeUnitSelected` before any corpus access if an edge unit was selected.
pub(super) fn retrieve(concat: &UnitConcatenator<'_>, units: &[SelectedUnit]) -> Result<ConcatTable> {
    if let Some(edge) = units.iter().find(|selected| selected.unit.is_edge) {
        return Err(Error::EdgeUnitSelected { index: edge.unit.index });
    }
    overlap::retrieve(concat, units)
}

/// Build the per-unit arrays and hand them to the engine.
///
/// Units without corpus audio get a silent frame of their target duration first. A right
/// context is kept only where the selection breaks natural corpus order, i.e. where the
/// unit's corpus successor is not the next selected unit.
pub(super) fn generate(concat: &UnitConcatenator<'_>, sync: &PitchSync, units: &[SelectedUnit], table: ConcatTable) -> Result<AudioStream> {
    let sample_rate = concat.format.sample_rate;
    let mut input = PitchSyncInput::default();
    let mut natural_joins = 0;

    for (i, selected) in units.iter().enumerate() {
        let data = table.get(i)?;
        let frames = if data.frames().is_empty() { vec![base::silence_for(selected, sample_rate)] } else { data.frames().to_vec() };
        let realized: u64 = frames.iter().map(|dg| dg.duration() as u64).sum();
        let frame_count = frames.len();

        let next_in_corpus = concat.database.next_unit(&selected.unit);
        let next_selected = units.get(i + 1).map(|next| next.unit);
        let right_context = match next_in_corpus {
            Some(next) if Some(next) == next_selected => {
                natural_joins += 1;
                None
            }
            _ => data.right_context().cloned(),
        };

        let time_scale = if selected.target.is_transient() {
            1.0 // bursts keep their natural length
        } else {
            sync.time_scale(selected.unit.index, selected.target.duration * sample_rate as f64, realized)
        };

        input.frames.push(frames);
        input.voicings.push(vec![selected.target.is_voiced(); frame_count]);
        input.right_contexts.push(right_context);
        input.pitch_scales.push(vec![sync.pitch_scale(); frame_count]);
        input.time_scales.push(vec![time_scale; frame_count]);
    }

    debug!("Pitch-synchronous generate: {} units, {} natural joins", units.len(), natural_joins);
    sync.engine.resynthesize(input, concat.format)
}
