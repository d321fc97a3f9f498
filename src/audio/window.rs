//! Half-Hann windows for cross-fading at unit joins.

use std::f64::consts::PI;

/// Value of a Hann window of length `len` at index `i`.
///
/// The periodic form is used so that the two halves of a window sum to exactly one.
pub fn hann(i: usize, len: usize) -> f64 {
    if len == 0 {
        return 1.0;
    }
    0.5 * (1.0 - (2.0 * PI * i as f64 / len as f64).cos())
}

/// Apply the rising half of a Hann window spanning `2 * samples.len()` (fade-in).
pub fn fade_in(samples: &mut [f64]) {
    let len = 2 * samples.len();
    for (i, s) in samples.iter_mut().enumerate() {
        *s *= hann(i, len);
    }
}

/// Apply the falling half of a Hann window spanning `2 * samples.len()` (fade-out).
pub fn fade_out(samples: &mut [f64]) {
    let half = samples.len();
    for (i, s) in samples.iter_mut().enumerate() {
        *s *= hann(half + i, 2 * half);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halves_are_complementary() {
        let mut rising = vec![1.0; 64];
        let mut falling = vec![1.0; 64];
        fade_in(&mut rising);
        fade_out(&mut falling);

        assert_eq!(rising[0], 0.0);
        assert_eq!(falling[0], 1.0);
        assert!((rising[32] - 0.5).abs() < 1e-12);
        for (r, f) in rising.iter().zip(&falling) {
            assert!((r + f - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_fade_in_is_monotonic() {
        let mut samples = vec![1.0; 16];
        fade_in(&mut samples);
        assert!(samples.windows(2).all(|w| w[0] <= w[1]));
        assert!(samples[15] < 1.0);
    }
}
