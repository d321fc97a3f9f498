//! WAV output for synthesized audio.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::stream::to_pcm16;
use crate::error::Result;

/// Write normalized mono samples as a 16-bit PCM WAV file.
///
/// # Errors
/// Returns an error if the file cannot be created or written.
pub fn write_wav(path: &Path, samples: &[f64], sample_rate: u32) -> Result<()> {
    let spec = WavSpec { channels: 1, sample_rate, bits_per_sample: 16, sample_format: SampleFormat::Int };
    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(to_pcm16(sample))?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        write_wav(&path, &[0.0, 0.5, -0.5, 1.0], 16000).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0, 16384, -16384, i16::MAX]);
    }
}
