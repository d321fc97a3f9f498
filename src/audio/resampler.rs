//! Output resampling using rubato FFT-based resampler.
//!
//! The synthesized waveform is produced at the timeline's sample rate; sinks that need
//! another rate get a batch-resampled copy.

use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{Fft, FixedSync, Resampler};
use tracing::debug;

use crate::error::{Error, Result};

/// Chunk size for FFT-based resampling (provides good quality and performance).
const CHUNK_SIZE: usize = 1024;

/// Number of sub-chunks for FFT processing (higher = better quality but more CPU).
const SUB_CHUNKS: usize = 2;

/// Resample audio from one sample rate to another (batch processing).
///
/// # Arguments
/// * `samples` - Input audio samples
/// * `from_rate` - Input sample rate (e.g., 16000 for the voice timeline)
/// * `to_rate` - Output sample rate (e.g., 48000 for the output file)
///
/// # Returns
/// Resampled audio samples at the target rate, `samples.len() * to_rate / from_rate` long
pub fn resample(samples: &[f64], from_rate: u32, to_rate: u32) -> Result<Vec<f64>> {
    // No resampling needed if rates match
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = Fft::<f64>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        SUB_CHUNKS,
        1, // mono
        FixedSync::Input,
    )
    .map_err(|e| Error::Resample(format!("failed to create resampler: {}", e)))?;

    let output_frames_max = resampler.output_frames_max();
    let mut output_buffer = vec![0.0f64; output_frames_max];

    let expected_len = (samples.len() as f64 * to_rate as f64 / from_rate as f64) as usize;

    // The FFT resampler delays its output; run past the end of the input until the delayed
    // signal is fully out, then drop the leading delay
    let delay = resampler.output_delay();
    let needed = delay + expected_len;
    let mut output = Vec::with_capacity(needed + output_frames_max);

    let mut pos = 0;
    let mut input_chunk = vec![0.0f64; CHUNK_SIZE];

    // Process in chunks, zero-padded past the end of the input
    while output.len() < needed {
        let start = pos.min(samples.len());
        let end = (pos + CHUNK_SIZE).min(samples.len());
        let chunk = &samples[start..end];
        input_chunk[..chunk.len()].copy_from_slice(chunk);
        input_chunk[chunk.len()..].fill(0.0);

        let input_adapter = InterleavedSlice::new(&input_chunk, 1, CHUNK_SIZE).map_err(|e| Error::Resample(format!("input adapter: {}", e)))?;
        let mut output_adapter =
            InterleavedSlice::new_mut(&mut output_buffer, 1, output_frames_max).map_err(|e| Error::Resample(format!("output adapter: {}", e)))?;

        let (_, frames_written) = resampler.process_into_buffer(&input_adapter, &mut output_adapter, None).map_err(|e| Error::Resample(e.to_string()))?;
        output.extend_from_slice(&output_buffer[..frames_written]);

        pos += CHUNK_SIZE;
        if frames_written == 0 && pos >= samples.len() {
            break;
        }
    }

    output.drain(..delay.min(output.len()));
    output.resize(expected_len, 0.0);
    debug!("Resampled {} -> {} samples ({} Hz -> {} Hz)", samples.len(), output.len(), from_rate, to_rate);

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resample_upsampling() {
        // Upsample from 16kHz to 48kHz (3x)
        let samples = vec![0.0; 16000]; // 1 second at 16kHz
        let result = resample(&samples, 16000, 48000).unwrap();
        assert_eq!(result.len(), 48000);
    }

    #[test]
    fn test_resample_downsampling() {
        // Downsample from 48kHz to 16kHz (1/3x)
        let samples = vec![0.0; 48000]; // 1 second at 48kHz
        let result = resample(&samples, 48000, 16000).unwrap();
        assert_eq!(result.len(), 16000);
    }

    #[test]
    fn test_resampler_delay_is_removed() {
        // An impulse at 0.5 s must stay at 0.5 s
        let mut samples = vec![0.0; 16000];
        samples[8000] = 1.0;
        let result = resample(&samples, 16000, 48000).unwrap();
        let peak = result.iter().enumerate().max_by(|a, b| a.1.abs().total_cmp(&b.1.abs())).map(|(i, _)| i).unwrap();
        assert!((peak as i64 - 24000).abs() <= 3, "impulse moved to {}", peak);
    }

    #[test]
    fn test_same_rate_is_a_copy() {
        let samples = vec![0.25, -0.5, 0.125];
        assert_eq!(resample(&samples, 22050, 22050).unwrap(), samples);
    }
}
