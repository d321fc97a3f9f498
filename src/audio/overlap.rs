//! Overlap-add sample stream decoder.
//!
//! Datagrams arrive grouped per unit. When a group starts and the previous unit supplied
//! a right context, the first frame of the group is faded in while the right context (the
//! previous unit's natural continuation in the corpus) is faded out and added on top.

use super::SampleSource;
use super::buffer::SampleBuffer;
use super::window;
use crate::corpus::Datagram;

/// Initial buffer size in samples.
const INITIAL_BUFFER_SIZE: usize = 1024;

/// Samples decoded per refill when the decoder is iterated one sample at a time.
const ITER_CHUNK: usize = 256;

/// Walks per-unit frame groups in order, frame by frame.
#[derive(Debug)]
struct FrameCursor {
    groups: Vec<Vec<Datagram>>,
    right_contexts: Vec<Option<Datagram>>,
    unit: usize,
    frame: usize,
}

impl FrameCursor {
    /// Next frame, with the right context to overlap into it when it opens a new group.
    fn next_frame(&mut self) -> Option<(Datagram, Option<Datagram>)> {
        while self.unit < self.groups.len() && self.frame >= self.groups[self.unit].len() {
            self.unit += 1;
            self.frame = 0;
        }
        let frame = self.groups.get(self.unit)?.get(self.frame)?.clone();

        let context = if self.frame == 0 && self.unit > 0 { self.right_contexts.get(self.unit - 1).cloned().flatten() } else { None };

        self.frame += 1;
        Some((frame, context))
    }

    fn is_exhausted(&self) -> bool {
        self.groups[self.unit.min(self.groups.len())..].iter().enumerate().all(|(i, g)| if i == 0 { self.frame >= g.len() } else { g.is_empty() })
    }
}

/// Decodes unit frame groups, cross-fading right contexts into unit joins.
#[derive(Debug)]
pub struct OverlapSampleDecoder {
    cursor: FrameCursor,
    pending: u64, // Sum of durations of frames not yet decoded
    total: u64,
    buffer: SampleBuffer,
}

impl OverlapSampleDecoder {
    /// Create a decoder over `groups`, where `right_contexts[i]` is overlapped into the
    /// start of group `i + 1`. Missing entries mean no overlap.
    pub fn new(groups: Vec<Vec<Datagram>>, right_contexts: Vec<Option<Datagram>>) -> Self {
        let total = groups.iter().flatten().map(|dg| dg.duration() as u64).sum();
        Self {
            cursor: FrameCursor { groups, right_contexts, unit: 0, frame: 0 },
            pending: total,
            total,
            buffer: SampleBuffer::with_capacity(INITIAL_BUFFER_SIZE),
        }
    }

    /// Decode frames until at least `min_count` new samples are buffered.
    ///
    /// # Returns
    /// `false` if the frames ran out before `min_count` samples were produced.
    pub fn fill(&mut self, min_count: usize) -> bool {
        self.buffer.fill_with(min_count, |out| {
            let Some((frame, context)) = self.cursor.next_frame() else {
                return false;
            };
            self.pending -= frame.duration() as u64;

            let start = out.len();
            frame.decode_into(out);

            if let Some(context) = context {
                window::fade_in(&mut out[start..]);
                let mut tail = context.decode();
                window::fade_out(&mut tail);
                for (sample, overlap) in out[start..].iter_mut().zip(&tail) {
                    *sample += overlap;
                }
            }
            true
        })
    }
}

impl SampleSource for OverlapSampleDecoder {
    fn total_length(&self) -> u64 {
        self.total
    }

    fn has_more(&self) -> bool {
        !self.buffer.is_empty() || !self.cursor.is_exhausted()
    }

    fn available(&self) -> u64 {
        self.buffer.len() as u64 + self.pending
    }

    fn read(&mut self, out: &mut [f64]) -> usize {
        if self.buffer.len() < out.len() {
            self.fill(out.len() - self.buffer.len());
        }
        self.buffer.read(out)
    }
}

impl Iterator for OverlapSampleDecoder {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.buffer.is_empty() {
            self.fill(ITER_CHUNK);
        }
        self.buffer.pop()
    }
}
