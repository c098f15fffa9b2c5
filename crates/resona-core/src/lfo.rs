//! Sub-audio sine oscillator for delay-time modulation.
//!
//! Phase-accumulator sine, nothing more. The reverb gives each delay line
//! one of these at an independent sub-Hz rate so the line lengths drift
//! apart and periodic comb coloration never locks in.

use core::f32::consts::TAU;
use libm::sinf;

/// Low-frequency sine oscillator.
#[derive(Debug, Clone)]
pub struct Lfo {
    phase: f32,
    phase_inc: f32,
    sample_rate: f32,
}

impl Lfo {
    /// Create an LFO at the given rate.
    pub fn new(sample_rate: f32, freq_hz: f32) -> Self {
        Self {
            phase: 0.0,
            phase_inc: freq_hz / sample_rate,
            sample_rate,
        }
    }

    /// Change the rate in Hz.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        self.phase_inc = freq_hz / self.sample_rate;
    }

    /// Offset the starting phase, in cycles [0, 1).
    pub fn set_phase(&mut self, phase: f32) {
        self.phase = phase.rem_euclid(1.0);
    }

    /// Next sample in [-1, 1].
    #[inline]
    pub fn next(&mut self) -> f32 {
        let out = sinf(self.phase * TAU);
        self.phase += self.phase_inc;
        if self.phase >= 1.0 {
            self.phase -= 1.0;
        }
        out
    }

    /// Restart from phase 0.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Update sample rate, keeping the rate in Hz.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        let freq = self.phase_inc * self.sample_rate;
        self.sample_rate = sample_rate;
        self.phase_inc = freq / sample_rate;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_cycle_per_period() {
        let mut lfo = Lfo::new(1000.0, 1.0);
        for _ in 0..1000 {
            lfo.next();
        }
        let wrap_error = lfo.phase.min((lfo.phase - 1.0).abs());
        assert!(wrap_error < 0.01);
    }

    #[test]
    fn output_bounded() {
        let mut lfo = Lfo::new(48000.0, 3.7);
        for _ in 0..10000 {
            let v = lfo.next();
            assert!((-1.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn phase_offset_opposes() {
        let mut a = Lfo::new(48000.0, 2.0);
        let mut b = Lfo::new(48000.0, 2.0);
        b.set_phase(0.5);
        // sin(x) + sin(x + π) cancels for every sample.
        for _ in 0..100 {
            let (va, vb) = (a.next(), b.next());
            assert!((va + vb).abs() < 1e-4);
        }
    }
}
