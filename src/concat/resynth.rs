//! Pitch-synchronous resynthesis seam.
//!
//! The pitch-synchronous strategy hands its per-unit frames, voicing and scale factors to a
//! [`Resynthesizer`], which owns the final audio. [`PeriodResynthesizer`] is the engine used
//! unless the caller plugs in another one: it meets target durations by repeating or dropping
//! whole frames and leaves pitch untouched. Repeated unvoiced frames alternate direction so
//! that noise does not turn into an audible buzz.

use tracing::debug;

use crate::audio::{AudioFormat, AudioStream, OverlapSampleDecoder};
use crate::corpus::Datagram;
use crate::error::Result;

/// Parallel per-unit arrays handed to a resynthesis engine.
///
/// Every outer vector has one entry per selected unit; `voicings`, `pitch_scales` and
/// `time_scales` have one entry per frame of that unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PitchSyncInput {
    pub frames: Vec<Vec<Datagram>>,
    pub voicings: Vec<Vec<bool>>,
    pub right_contexts: Vec<Option<Datagram>>, // None where the join is natural
    pub pitch_scales: Vec<Vec<f64>>,
    pub time_scales: Vec<Vec<f64>>,
}

/// Pitch-synchronous resynthesis engine.
pub trait Resynthesizer {
    /// Turn the prepared frames into the final audio stream.
    ///
    /// # Arguments
    /// * `input` - Per-unit frames, voicing, right contexts and scale factors
    /// * `format` - Format of the returned stream
    ///
    /// # Errors
    /// Engine specific; the default engine never fails.
    fn resynthesize(&self, input: PitchSyncInput, format: AudioFormat) -> Result<AudioStream>;
}

/// Time-domain engine that stretches voiced units period by period.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodResynthesizer;

impl Resynthesizer for PeriodResynthesizer {
    fn resynthesize(&self, input: PitchSyncInput, format: AudioFormat) -> Result<AudioStream> {
        if input.pitch_scales.iter().flatten().any(|&scale| scale != 1.0) {
            debug!("Pitch scaling requested but not supported by the period engine; keeping original pitch");
        }

        let groups: Vec<Vec<Datagram>> = input
            .frames
            .iter()
            .enumerate()
            .map(|(i, frames)| {
                let voicing = input.voicings.get(i).map(Vec::as_slice).unwrap_or_default();
                let scales = input.time_scales.get(i).map(Vec::as_slice).unwrap_or_default();
                stretch_periods(frames, voicing, scales)
            })
            .collect();

        debug!(
            "Period engine: {} -> {} frames across {} units",
            input.frames.iter().map(Vec::len).sum::<usize>(),
            groups.iter().map(Vec::len).sum::<usize>(),
            groups.len()
        );
        Ok(AudioStream::new(format, OverlapSampleDecoder::new(groups, input.right_contexts)))
    }
}

/// Repeat or skip whole frames so that frame `i` lasts `scales[i]` times as long.
///
/// Frame counts accumulate across the unit, so the unit ends up `round(sum of scales)` frames
/// long, never less than one. Every other repeat of an unvoiced frame is played backwards.
fn stretch_periods(frames: &[Datagram], voicing: &[bool], scales: &[f64]) -> Vec<Datagram> {
    let Some(first) = frames.first() else {
        return Vec::new();
    };

    let mut stretched = Vec::with_capacity(frames.len());
    let mut target = 0.0;
    for (i, frame) in frames.iter().enumerate() {
        let scale = scales.get(i).copied().filter(|s| s.is_finite() && *s > 0.0).unwrap_or(1.0);
        let voiced = voicing.get(i).copied().unwrap_or(false);
        target += scale;

        let repeats = (target.round() as usize).saturating_sub(stretched.len());
        for r in 0..repeats {
            stretched.push(if !voiced && r % 2 == 1 { frame.reversed() } else { frame.clone() });
        }
    }

    if stretched.is_empty() {
        stretched.push(first.clone());
    }
    stretched
}
