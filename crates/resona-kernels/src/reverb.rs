//! Feedback-delay-network reverb.
//!
//! Four recirculating delay lines cross-coupled through the 4-channel
//! rotation mixer. Each line runs fixed input gain → one-pole damping →
//! an interpolated delay whose length drifts under a slow, independent
//! LFO → a soft clipper. The mixer's outputs are scaled by one shared
//! decay gain and fed back into a rotated permutation of the line inputs
//! (never a line's own output), and summed pairwise into two output buses.
//!
//! Structural properties, not tuning, carry the stability story:
//!
//! - the rotation stage is orthonormal, so loop gain is exactly the decay
//!   parameter, which is clamped below 1;
//! - the base lengths are mutually coprime primes, so no periodic comb
//!   pattern locks in;
//! - the per-line LFOs run at incommensurate sub-Hz rates, decorrelating
//!   the lines and defeating metallic resonances;
//! - delay-time modulation is slew-limited, so drifting lengths glide;
//! - the clipper bounds each line even under misconfiguration.

use resona_core::{
    BlockIo, DelayLine, Kernel, Lfo, OnePole, ParamBlocks, ParamDescriptor, ParamRate,
    RenderContext, Slew, SmoothedParam, sample_held, soft_clip,
};

use crate::rotate::rotate_quad;

const LINES: usize = 4;

/// Base line lengths in samples at the 44.1 kHz reference rate.
/// Mutually coprime primes; ratios avoid small common factors.
const BASE_DELAYS_44K: [f32; LINES] = [1031.0, 1327.0, 1523.0, 1871.0];

/// Reference rate the tuning constants were chosen at.
const REFERENCE_RATE: f32 = 44100.0;

/// Per-line modulation LFO rates in Hz, pairwise incommensurate.
const MOD_RATES_HZ: [f32; LINES] = [0.113, 0.167, 0.229, 0.293];

/// Peak delay-length modulation in samples.
const MOD_DEPTH_SAMPLES: f32 = 7.0;

/// Delay-time slew bound in samples per millisecond.
const DELAY_SLEW_PER_MS: f32 = 0.4;

/// Angle slew bound in radians per millisecond.
const ANGLE_SLEW_PER_MS: f32 = 0.02;

/// Gain applied to the external input before it enters each line.
const INPUT_GAIN: f32 = 0.5;

/// Loop gain ceiling; the margin below 1 keeps the tail finite even with
/// the decay parameter pinned at its maximum.
const MAX_DECAY: f32 = 0.98;

const TAU: f32 = core::f32::consts::TAU;

fn scaled_base(line: usize, sample_rate: f32) -> f32 {
    BASE_DELAYS_44K[line] * sample_rate / REFERENCE_RATE
}

struct Line {
    delay: DelayLine,
    damper: OnePole,
    modulation: Lfo,
    length: Slew,
    base: f32,
}

impl Line {
    fn new(index: usize, sample_rate: f32, damping_hz: f32) -> Self {
        let base = scaled_base(index, sample_rate);
        let capacity = (base + MOD_DEPTH_SAMPLES * 2.0 + 8.0) as usize;
        let mut modulation = Lfo::new(sample_rate, MOD_RATES_HZ[index]);
        // Stagger starting phases so the lines never move in lockstep.
        modulation.set_phase(index as f32 * 0.25);
        Self {
            delay: DelayLine::new(capacity),
            damper: OnePole::new(sample_rate, damping_hz),
            modulation,
            length: Slew::new(base),
            base,
        }
    }
}

/// Four-line FDN reverb kernel: mono in, stereo bus out.
pub struct FdnReverb {
    lines: [Line; LINES],
    /// Mixer output from the previous sample, already permuted onto its
    /// destination line.
    feedback: [f32; LINES],
    decay: SmoothedParam,
    angle: Slew,
    cross: Slew,
    cached_damping: f32,
    sample_rate: f32,
}

impl FdnReverb {
    /// Inlet names.
    pub const INLETS: &'static [&'static str] = &["in"];
    /// Outlet names.
    pub const OUTLETS: &'static [&'static str] = &["left", "right"];
    /// Parameter table.
    pub const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("decay", 0.0, MAX_DECAY, 0.85, ParamRate::KRate),
        ParamDescriptor::new("damping", 200.0, 12000.0, 4500.0, ParamRate::KRate),
        ParamDescriptor::new("angle", -TAU, TAU, 0.7854, ParamRate::KRate),
        ParamDescriptor::new("cross", -TAU, TAU, 0.6154, ParamRate::KRate),
    ];

    /// Create a reverb at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        let damping = 4500.0;
        Self {
            lines: core::array::from_fn(|i| Line::new(i, sample_rate, damping)),
            feedback: [0.0; LINES],
            decay: SmoothedParam::with_config(0.85, sample_rate, 30.0),
            angle: Slew::new(0.7854),
            cross: Slew::new(0.6154),
            cached_damping: damping,
            sample_rate,
        }
    }
}

impl Kernel for FdnReverb {
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
        self.decay
            .set_target(sample_held(params.get(0), 0).clamp(0.0, MAX_DECAY));
        let damping = sample_held(params.get(1), 0);
        if (damping - self.cached_damping).abs() > 0.5 {
            self.cached_damping = damping;
            for line in &mut self.lines {
                line.damper.set_frequency(damping);
            }
        }
        let angle_target = sample_held(params.get(2), 0);
        let cross_target = sample_held(params.get(3), 0);

        for i in 0..ctx.frames {
            let x = io.input(0).get(i).copied().unwrap_or(0.0);
            let x = if x.is_finite() { x } else { 0.0 };

            let decay = self.decay.advance();
            let theta = self
                .angle
                .next(angle_target, ANGLE_SLEW_PER_MS, self.sample_rate);
            let iota = self
                .cross
                .next(cross_target, ANGLE_SLEW_PER_MS, self.sample_rate);

            // Per line: gain -> damping -> modulated delay -> saturator.
            let mut outputs = [0.0f32; LINES];
            for (idx, line) in self.lines.iter_mut().enumerate() {
                let drive = INPUT_GAIN * x + decay * self.feedback[idx];
                let damped = line.damper.process(drive);
                let target_len = line.base + line.modulation.next() * MOD_DEPTH_SAMPLES;
                let len = line
                    .length
                    .next(target_len, DELAY_SLEW_PER_MS, self.sample_rate);
                outputs[idx] = soft_clip(line.delay.read_write(damped, len));
            }

            let mixed = rotate_quad(outputs, theta, iota);

            // Rotated feedback routing: mixer output j drives line j+1, so
            // no line ever feeds itself.
            for (j, &value) in mixed.iter().enumerate() {
                self.feedback[(j + 1) % LINES] = value;
            }

            io.outputs[0][i] = mixed[0] + mixed[2];
            io.outputs[1][i] = mixed[1] + mixed[3];
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        let damping = self.cached_damping;
        self.lines = core::array::from_fn(|i| Line::new(i, sample_rate, damping));
        self.feedback = [0.0; LINES];
        self.decay.set_sample_rate(sample_rate);
    }

    fn reset(&mut self) {
        for line in &mut self.lines {
            line.delay.clear();
            line.damper.reset();
            line.modulation.reset();
            line.length.snap(line.base);
        }
        self.feedback = [0.0; LINES];
    }
}
