//! Overlap strategy: like the base strategy, plus one right-context datagram per unit that
//! is cross-faded into the start of the following unit.

use tracing::debug;

use super::UnitConcatenator;
use super::base;
use super::data::ConcatTable;
use crate::audio::{AudioStream, OverlapSampleDecoder};
use crate::corpus::SelectedUnit;
use crate::error::Result;

/// Fetch each unit's datagrams and, when its corpus successor is speakable, the datagram
/// right after it.
pub(super) fn retrieve(concat: &UnitConcatenator<'_>, units: &[SelectedUnit]) -> Result<ConcatTable> {
    let mut table = base::retrieve(concat, units)?;
    for (selected, data) in units.iter().zip(table.iter_mut()) {
        if let Some(next) = concat.database.next_unit(&selected.unit)
            && !next.is_edge
        {
            let (start, size) = concat.timeline_span(&selected.unit);
            data.set_right_context(concat.timeline.datagram(start + size)?);
        }
    }
    Ok(table)
}

/// Render unit groups through the overlap-add decoder.
pub(super) fn generate(concat: &UnitConcatenator<'_>, units: &[SelectedUnit], table: ConcatTable) -> Result<AudioStream> {
    let mut groups = Vec::with_capacity(units.len());
    let mut right_contexts = Vec::with_capacity(units.len());
    for index in 0..units.len() {
        let data = table.get(index)?;
        groups.push(data.frames().to_vec());
        right_contexts.push(data.right_context().cloned());
    }
    debug!("Generating audio from {} unit groups, {} right contexts", groups.len(), right_contexts.iter().flatten().count());
    Ok(AudioStream::new(concat.format, OverlapSampleDecoder::new(groups, right_contexts)))
}
