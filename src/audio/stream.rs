//! Audio format and the pull-based audio stream handed to the audio sink.

use super::SampleSource;

/// PCM layout of the synthesized audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
    pub big_endian: bool,
}

impl AudioFormat {
    /// Signed 16-bit big-endian mono PCM at `sample_rate`.
    pub fn pcm16_mono(sample_rate: u32) -> Self {
        Self { sample_rate, bits_per_sample: 16, channels: 1, big_endian: true }
    }

    /// Bytes per frame.
    pub fn frame_size(&self) -> usize {
        (self.bits_per_sample as usize / 8) * self.channels as usize
    }
}

/// Convert a normalized sample to signed 16-bit PCM.
pub fn to_pcm16(sample: f64) -> i16 {
    (sample * 32768.0).round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// Lazily produced audio: samples are decoded only when pulled.
///
/// Dropping the stream is how a caller abandons a request.
pub struct AudioStream {
    format: AudioFormat,
    source: Box<dyn SampleSource>,
}

impl AudioStream {
    pub fn new(format: AudioFormat, source: impl SampleSource + 'static) -> Self {
        Self { format, source: Box::new(source) }
    }

    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Total length of the stream in frames.
    pub fn frame_length(&self) -> u64 {
        self.source.total_length()
    }

    /// Frames that can still be read.
    pub fn available(&self) -> u64 {
        self.source.available()
    }

    /// Read normalized samples into `out`; returns 0 at end of stream.
    pub fn read(&mut self, out: &mut [f64]) -> usize {
        self.source.read(out)
    }

    /// Read PCM bytes in the stream's format into `out`; returns the number of bytes written.
    ///
    /// Only whole frames are written.
    pub fn read_pcm(&mut self, out: &mut [u8]) -> usize {
        let frame_size = self.format.frame_size();
        let mut samples = vec![0.0; out.len() / frame_size];
        let n = self.source.read(&mut samples);
        for (chunk, &sample) in out.chunks_exact_mut(frame_size).zip(&samples[..n]) {
            let pcm = to_pcm16(sample);
            chunk.copy_from_slice(&if self.format.big_endian { pcm.to_be_bytes() } else { pcm.to_le_bytes() });
        }
        n * frame_size
    }

    /// Drain the whole stream.
    pub fn into_samples(mut self) -> Vec<f64> {
        let mut samples = Vec::with_capacity(self.source.available() as usize);
        let mut chunk = [0.0; 4096];
        loop {
            let n = self.source.read(&mut chunk);
            if n == 0 {
                break;
            }
            samples.extend_from_slice(&chunk[..n]);
        }
        samples
    }
}

impl Iterator for AudioStream {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        let mut sample = [0.0];
        (self.source.read(&mut sample) == 1).then_some(sample[0])
    }
}

impl std::fmt::Debug for AudioStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioStream").field("format", &self.format).field("frame_length", &self.frame_length()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::SampleDecoder;
    use crate::corpus::Datagram;

    #[test]
    fn test_pcm_conversion_clamps() {
        assert_eq!(to_pcm16(0.0), 0);
        assert_eq!(to_pcm16(-1.0), i16::MIN);
        assert_eq!(to_pcm16(1.0), i16::MAX);
        assert_eq!(to_pcm16(0.5), 16384);
    }

    #[test]
    fn test_read_pcm_is_big_endian() {
        let decoder = SampleDecoder::new(vec![Datagram::from_samples(&[258, -2, 7])]);
        let mut stream = AudioStream::new(AudioFormat::pcm16_mono(16000), decoder);
        assert_eq!(stream.format().frame_size(), 2);

        let mut bytes = [0u8; 5];
        assert_eq!(stream.read_pcm(&mut bytes), 4);
        assert_eq!(&bytes[..4], &[1, 2, 0xff, 0xfe]);
        assert_eq!(stream.available(), 1);
        assert_eq!(stream.next().map(to_pcm16), Some(7));
        assert_eq!(stream.next(), None);
    }
}
