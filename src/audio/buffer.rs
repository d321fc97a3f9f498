//! Growable sample buffer shared by the datagram decoders.

/// Samples produced ahead of the consumer.
///
/// Storage grows on demand and is never shrunk. Consumed samples are dropped by
/// moving the unread tail to the front before the buffer would otherwise have to grow.
#[derive(Debug, Default)]
pub struct SampleBuffer {
    samples: Vec<f64>,
    read_pos: usize,
}

impl SampleBuffer {
    /// Create a buffer with room for `capacity` samples.
    pub fn with_capacity(capacity: usize) -> Self {
        Self { samples: Vec::with_capacity(capacity), read_pos: 0 }
    }

    /// Number of buffered, not yet consumed samples.
    pub fn len(&self) -> usize {
        self.samples.len() - self.read_pos
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Allocated storage, in samples.
    pub fn capacity(&self) -> usize {
        self.samples.capacity()
    }

    /// Produce at least `min_count` new samples by calling `refill` repeatedly.
    ///
    /// `refill` appends one chunk of samples (e.g. one decoded datagram) to the vector it
    /// is given and returns `false` once its source is exhausted. Samples it appends may be
    /// modified in place before it returns.
    ///
    /// # Returns
    /// `true` if at least `min_count` samples were produced.
    pub fn fill_with<F>(&mut self, min_count: usize, mut refill: F) -> bool
    where
        F: FnMut(&mut Vec<f64>) -> bool,
    {
        self.make_room(min_count);

        let before = self.samples.len();
        while self.samples.len() - before < min_count {
            if !refill(&mut self.samples) {
                break;
            }
        }
        self.samples.len() - before >= min_count
    }

    /// Copy buffered samples into `out`, returning how many were copied.
    pub fn read(&mut self, out: &mut [f64]) -> usize {
        let n = out.len().min(self.len());
        out[..n].copy_from_slice(&self.samples[self.read_pos..self.read_pos + n]);
        self.read_pos += n;
        n
    }

    /// Take the next buffered sample.
    pub fn pop(&mut self) -> Option<f64> {
        let sample = self.samples.get(self.read_pos).copied()?;
        self.read_pos += 1;
        Some(sample)
    }

    /// Compact before growing: append cost stays proportional to what is still unread.
    fn make_room(&mut self, min_count: usize) {
        if self.read_pos > 0 && self.samples.capacity() - self.samples.len() < min_count {
            self.samples.drain(..self.read_pos);
            self.read_pos = 0;
        }
        self.samples.reserve(min_count);
    }
}
