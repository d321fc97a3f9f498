//! Sample stream decoder: a queue of datagrams pulled out as normalized samples.

use std::collections::VecDeque;

use super::SampleSource;
use super::buffer::SampleBuffer;
use crate::corpus::Datagram;

/// Initial buffer size in samples.
const INITIAL_BUFFER_SIZE: usize = 1024;

/// Samples decoded per refill when the decoder is iterated one sample at a time.
const ITER_CHUNK: usize = 256;

/// Decodes an ordered list of datagrams on demand.
///
/// Each datagram is decoded whole before the next one is touched.
#[derive(Debug)]
pub struct SampleDecoder {
    queue: VecDeque<Datagram>, // Datagrams not yet decoded
    queued: u64,               // Sum of their durations
    total: u64,                // Total length of the stream
    buffer: SampleBuffer,      // Decoded samples not yet consumed
}

impl SampleDecoder {
    /// Create a decoder over `datagrams`, in order.
    pub fn new(datagrams: impl IntoIterator<Item = Datagram>) -> Self {
        let queue: VecDeque<Datagram> = datagrams.into_iter().collect();
        let total = queue.iter().map(|dg| dg.duration() as u64).sum();
        Self { queue, queued: total, total, buffer: SampleBuffer::with_capacity(INITIAL_BUFFER_SIZE) }
    }

    /// Decode queued datagrams until at least `min_count` new samples are buffered.
    ///
    /// # Returns
    /// `false` if the queue ran out before `min_count` samples were produced.
    pub fn fill(&mut self, min_count: usize) -> bool {
        self.buffer.fill_with(min_count, |out| {
            let Some(datagram) = self.queue.pop_front() else {
                return false;
            };
            self.queued -= datagram.duration() as u64;
            datagram.decode_into(out);
            true
        })
    }
}

impl SampleSource for SampleDecoder {
    fn total_length(&self) -> u64 {
        self.total
    }

    fn has_more(&self) -> bool {
        !self.buffer.is_empty() || !self.queue.is_empty()
    }

    fn available(&self) -> u64 {
        self.buffer.len() as u64 + self.queued
    }

    fn read(&mut self, out: &mut [f64]) -> usize {
        if self.buffer.len() < out.len() {
            self.fill(out.len() - self.buffer.len());
        }
        self.buffer.read(out)
    }
}

impl Iterator for SampleDecoder {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.buffer.is_empty() {
            self.fill(ITER_CHUNK);
        }
        self.buffer.pop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize, offset: i16) -> Datagram {
        Datagram::from_samples(&(0..len as i16).map(|i| (i + offset) * 100).collect::<Vec<_>>())
    }

    #[test]
    fn test_decodes_in_order() {
        let decoder = SampleDecoder::new(vec![ramp(3, 0), Datagram::silence(2), ramp(2, 10)]);
        let samples: Vec<i16> = decoder.map(|s| (s * 32768.0).round() as i16).collect();
        assert_eq!(samples, vec![0, 100, 200, 0, 0, 1000, 1100]);
    }

    #[test]
    fn test_available_is_additive() {
        let datagrams = vec![ramp(40, 0), ramp(25, 1), Datagram::silence(0), ramp(35, 2)];
        let mut decoder = SampleDecoder::new(datagrams);
        assert_eq!(decoder.total_length(), 100);
        assert_eq!(decoder.available(), 100);

        let mut out = [0.0; 30];
        assert_eq!(decoder.read(&mut out), 30);
        assert_eq!(decoder.available(), 70);

        assert_eq!(decoder.read(&mut out), 30);
        assert_eq!(decoder.available(), 40);
        assert_eq!(decoder.total_length(), 100);
    }

    #[test]
    fn test_fill_reports_shortfall() {
        let mut decoder = SampleDecoder::new(vec![ramp(10, 0), ramp(10, 0)]);
        assert!(decoder.fill(15));
        assert_eq!(decoder.available(), 20);
        assert!(!decoder.fill(5));
        assert!(decoder.has_more());

        let mut out = [0.0; 64];
        assert_eq!(decoder.read(&mut out), 20);
        assert!(!decoder.has_more());
        assert_eq!(decoder.read(&mut out), 0);
    }

    #[test]
    fn test_empty_decoder() {
        let mut decoder = SampleDecoder::new(Vec::new());
        assert_eq!(decoder.total_length(), 0);
        assert!(!decoder.has_more());
        assert_eq!(decoder.next(), None);
    }
}
