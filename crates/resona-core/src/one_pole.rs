//! One-pole lowpass for loop damping.
//!
//! The simplest possible lowpass — 6 dB/octave, one multiply per sample:
//!
//! ```text
//! y[n] = x[n] + coeff * (y[n-1] - x[n]),   coeff = exp(-2π f / sr)
//! ```
//!
//! Each pass around a reverberant feedback loop loses a little top end
//! through one of these, the way air and walls absorb high frequencies.

use crate::math::flush_denormal;
use libm::expf;

/// One-pole (6 dB/oct) lowpass filter.
#[derive(Debug, Clone)]
pub struct OnePole {
    state: f32,
    coeff: f32,
    freq: f32,
    sample_rate: f32,
}

impl OnePole {
    /// Create a lowpass with the given cutoff.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        let mut filter = Self {
            state: 0.0,
            coeff: 0.0,
            freq: freq_hz,
            sample_rate,
        };
        filter.recalculate_coeff();
        filter
    }

    /// Move the −3 dB point.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.freq = freq_hz;
        self.recalculate_coeff();
    }

    /// Filter one sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = flush_denormal(input + self.coeff * (self.state - input));
        self.state
    }

    /// Zero the filter history.
    pub fn reset(&mut self) {
        self.state = 0.0;
    }

    /// Update sample rate, keeping the cutoff.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.recalculate_coeff();
    }

    fn recalculate_coeff(&mut self) {
        // freq = 0 -> coeff ≈ 1 (full filtering); Nyquist -> coeff ≈ 0.
        self.coeff = expf(-core::f32::consts::TAU * self.freq.max(0.0) / self.sample_rate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_dc() {
        let mut lp = OnePole::new(48000.0, 1000.0);
        let mut out = 0.0;
        for _ in 0..48000 {
            out = lp.process(1.0);
        }
        assert!((out - 1.0).abs() < 1e-4, "DC should pass, got {out}");
    }

    #[test]
    fn attenuates_nyquist() {
        let mut lp = OnePole::new(48000.0, 100.0);
        let mut sum = 0.0f32;
        for i in 0..4800 {
            let input = if i % 2 == 0 { 1.0 } else { -1.0 };
            sum += lp.process(input).abs();
        }
        assert!(sum / 4800.0 < 0.05);
    }

    #[test]
    fn reset_clears_state() {
        let mut lp = OnePole::new(48000.0, 1000.0);
        lp.process(1.0);
        lp.reset();
        assert_eq!(lp.process(0.0), 0.0);
    }
}
