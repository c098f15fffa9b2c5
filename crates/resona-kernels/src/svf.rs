//! Zero-delay-feedback state-variable filter.
//!
//! One input, three simultaneous outputs (lowpass, highpass, bandpass).
//! The instantaneous feedback around the two integrators is solved
//! algebraically per sample, so the filter stays stable and keeps its
//! analog-prototype response under audio-rate modulation of cutoff and Q —
//! the failure mode of naive difference-equation SVFs.
//!
//! Cutoff and resonance are k-rate controls slewed at the sample rate
//! inside the kernel; a block-boundary step in either lands as a short
//! ramp on the coefficients.

use libm::tanf;
use resona_core::{
    BlockIo, Kernel, ParamBlocks, ParamDescriptor, ParamRate, ParamScale, RenderContext, Slew,
    flush_denormal, sample_held,
};

const PI: f32 = core::f32::consts::PI;

/// Cutoff slew bound: a full 20 Hz → 20 kHz sweep takes ~80 ms.
const CUTOFF_SLEW_PER_MS: f32 = 250.0;
/// Resonance slew bound.
const Q_SLEW_PER_MS: f32 = 0.5;
/// Floor keeping the damping term finite for tiny Q.
const MIN_Q: f32 = 1e-3;

/// State-variable filter kernel.
#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    s1: f32,
    s2: f32,
    cutoff: Slew,
    resonance: Slew,
    sample_rate: f32,
}

impl StateVariableFilter {
    /// Inlet names.
    pub const INLETS: &'static [&'static str] = &["in"];
    /// Outlet names.
    pub const OUTLETS: &'static [&'static str] = &["lowpass", "highpass", "bandpass"];
    /// Parameter table.
    pub const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("cutoff", 0.0, 20000.0, 1000.0, ParamRate::KRate)
            .with_scale(ParamScale::Power(0.4)),
        ParamDescriptor::new("resonance", MIN_Q, core::f32::consts::TAU, 0.707, ParamRate::KRate),
    ];

    /// Create a filter at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            s1: 0.0,
            s2: 0.0,
            cutoff: Slew::new(1000.0),
            resonance: Slew::new(0.707),
            sample_rate,
        }
    }

    /// One sample through the filter; returns (lowpass, highpass, bandpass).
    #[inline]
    fn tick(&mut self, x: f32, freq: f32, q: f32) -> (f32, f32, f32) {
        // Prewarp the cutoff so the digital response lines up with the
        // analog prototype at freq, then fold the warp into g.
        let clamped = freq.clamp(0.0, self.sample_rate * 0.49);
        let t = tanf(PI * clamped / self.sample_rate);
        let g = t / (1.0 + t);
        let r = 1.0 / (2.0 * q.max(MIN_Q));

        let a = 1.0 / (g * g + 2.0 * r * g + 1.0);
        let hp = a * (x - (g + 2.0 * r) * self.s1 - self.s2);
        let bp = hp * g + self.s1;
        let lp = bp * g + self.s2;

        self.s1 = flush_denormal(hp * g + bp);
        self.s2 = flush_denormal(bp * g + lp);

        (lp, hp, bp)
    }
}

impl Kernel for StateVariableFilter {
    fn inlets(&self) -> &'static [&'static str] {
        Self::INLETS
    }

    fn outlets(&self) -> &'static [&'static str] {
        Self::OUTLETS
    }

    fn params(&self) -> &'static [ParamDescriptor] {
        Self::PARAMS
    }

    fn render(&mut self, ctx: &RenderContext, io: &mut BlockIo<'_>, params: &ParamBlocks<'_>) {
        let cutoff_target = sample_held(params.get(0), 0);
        let q_target = sample_held(params.get(1), 0);
        for i in 0..ctx.frames {
            let freq = self
                .cutoff
                .next(cutoff_target, CUTOFF_SLEW_PER_MS, self.sample_rate);
            let q = self
                .resonance
                .next(q_target, Q_SLEW_PER_MS, self.sample_rate);
            let x = io.input(0).get(i).copied().unwrap_or(0.0);
            // Malformed upstream values must not poison the integrators.
            let x = if x.is_finite() { x } else { 0.0 };
            let (lp, hp, bp) = self.tick(x, freq, q);
            io.outputs[0][i] = lp;
            io.outputs[1][i] = hp;
            io.outputs[2][i] = bp;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}
