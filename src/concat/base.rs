//! Base strategy: fetch each unit's datagrams and play them back to back.

use tracing::debug;

use super::UnitConcatenator;
use super::data::{ConcatTable, ConcatenationData};
use crate::audio::{AudioStream, SampleDecoder};
use crate::corpus::{Datagram, SelectedUnit};
use crate::error::Result;

/// Fetch the datagrams spanning each unit from the timeline.
pub(super) fn retrieve(concat: &UnitConcatenator<'_>, units: &[SelectedUnit]) -> Result<ConcatTable> {
    let mut table = ConcatTable::with_capacity(units.len());
    for selected in units {
        let (start, size) = concat.timeline_span(&selected.unit);
        let frames = concat.timeline.datagrams(start, size)?;
        table.push(ConcatenationData::new(frames));
    }
    Ok(table)
}

/// Settle the frames to render: retrieved frames as they are, or silence for units
/// without corpus audio. Records one pitchmark at the end of every frame.
pub(super) fn realize(concat: &UnitConcatenator<'_>, units: &[SelectedUnit], table: &mut ConcatTable) {
    let sample_rate = concat.format.sample_rate;
    for (selected, data) in units.iter().zip(table.iter_mut()) {
        if data.frames().is_empty() {
            data.set_frames(vec![silence_for(selected, sample_rate)]);
        }

        let pitchmarks = data
            .frames()
            .iter()
            .scan(0u64, |end, dg| {
                *end += dg.duration() as u64;
                Some(*end)
            })
            .collect();
        data.set_pitchmarks(pitchmarks);
    }
}

/// Zero-filled frame standing in for a unit without corpus audio, sized to its target.
pub(super) fn silence_for(selected: &SelectedUnit, sample_rate: u32) -> Datagram {
    let length = selected.target.duration_in_samples(sample_rate);
    if selected.target.is_silence() {
        debug!("Pause unit {}: {} samples of silence", selected.unit.index, length);
    } else {
        debug!("No audio for unit {} ('{}'): inserting {} samples of silence", selected.unit.index, selected.target.phone, length);
    }
    Datagram::silence(length)
}

/// Render all frames, in selection order, as one flat stream.
pub(super) fn generate(concat: &UnitConcatenator<'_>, units: &[SelectedUnit], table: ConcatTable) -> Result<AudioStream> {
    let mut frames = Vec::new();
    for index in 0..units.len() {
        frames.extend_from_slice(table.get(index)?.frames());
    }
    debug!("Generating audio from {} frames", frames.len());
    Ok(AudioStream::new(concat.format, SampleDecoder::new(frames)))
}
