//! Self-modulating sine oscillator.
//!
//! A phase-accumulator sine whose phase argument is displaced by the
//! previous output sample scaled by a feedback amount. Small positive
//! feedback skews the sine toward a saw; negative feedback squares the
//! feedback term first, pushing toward square-ish timbres. High magnitudes
//! go chaotic and alias freely — expected musical behavior, not an error.
//!
//! Phase is accumulated incrementally in `f64` and wrapped to [0, 1) every
//! sample, so frequency changes never produce a phase discontinuity and
//! the accumulator stays bounded over arbitrarily long runs.

use libm::sin;
use resona_core::{
    BlockIo, Kernel, ParamBlocks, ParamDescriptor, ParamRate, ParamScale, RenderContext, Slew,
    sample_held,
};

const TAU: f64 = core::f64::consts::TAU;

/// Feedback slew bound: full-range changes land over ~100 ms.
const FEEDBACK_SLEW_PER_MS: f32 = 0.02;

/// Feedback sine oscillator kernel.
#[derive(Debug, Clone)]
pub struct FeedbackOscillator {
    phase: f64,
    prev_out: f32,
    feedback: Slew,
    sample_rate: f32,
}

impl FeedbackOscillator {
    /// Inlet names.
    pub const INLETS: &'static [&'static str] = &[];
    /// Outlet names.
    pub const OUTLETS: &'static [&'static str] = &["out"];
    /// Parameter table.
    pub const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("frequency", 0.0, 20000.0, 220.0, ParamRate::ARate)
            .with_scale(ParamScale::Power(0.4)),
        ParamDescriptor::new("feedback", -1.0, 1.0, 0.0, ParamRate::KRate),
    ];

    /// Create an oscillator at the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            phase: 0.0,
            prev_out: 0.0,
            feedback: Slew::new(0.0),
            sample_rate,
        }
    }
}

impl Kernel for FeedbackOscillator {
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
        let freq = params.get(0);
        let fb_target = sample_held(params.get(1), 0);
        let sr = f64::from(self.sample_rate);

        for i in 0..ctx.frames {
            let f = f64::from(sample_held(freq, i));
            self.phase = (self.phase + f / sr).rem_euclid(1.0);

            let fb = self
                .feedback
                .next(fb_target, FEEDBACK_SLEW_PER_MS, self.sample_rate);
            let mut term = fb * self.prev_out;
            if fb < 0.0 {
                term *= term;
            }

            let out = sin(TAU * self.phase + f64::from(term)) as f32;
            io.outputs[0][i] = out;
            // The history sample is the average of the last two outputs,
            // which tames the feedback path's sample-to-sample swing.
            self.prev_out = 0.5 * (out + self.prev_out);
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
        self.prev_out = 0.0;
        self.feedback.snap(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(osc: &mut FeedbackOscillator, freq: f32, feedback: f32, frames: usize) -> Vec<f32> {
        let mut outputs = vec![vec![0.0; frames]];
        let params = vec![vec![freq; frames], vec![feedback]];
        let ctx = RenderContext {
            sample_rate: 48000.0,
            frames,
        };
        let mut io = BlockIo {
            inputs: &[],
            outputs: &mut outputs,
        };
        osc.render(&ctx, &mut io, &ParamBlocks::new(&params));
        outputs.pop().unwrap()
    }

    /// Count rising zero crossings to estimate the period.
    fn rising_crossings(samples: &[f32]) -> usize {
        samples
            .windows(2)
            .filter(|w| w[0] <= 0.0 && w[1] > 0.0)
            .count()
    }

    #[test]
    fn zero_feedback_is_pure_sine_at_requested_frequency() {
        let mut osc = FeedbackOscillator::new(48000.0);
        let out = render(&mut osc, 480.0, 0.0, 48000);
        // 480 Hz over 1 s of samples -> 480 cycles, within edge tolerance.
        let crossings = rising_crossings(&out);
        assert!(
            (479..=481).contains(&crossings),
            "expected ~480 cycles, counted {crossings}"
        );
        for v in &out {
            assert!(v.abs() <= 1.0 + 1e-6);
        }
    }

    #[test]
    fn output_bounded_at_extreme_feedback() {
        for fb in [-1.0, -0.7, 0.7, 1.0] {
            let mut osc = FeedbackOscillator::new(48000.0);
            let out = render(&mut osc, 1000.0, fb, 9600);
            for v in &out {
                assert!(v.is_finite() && v.abs() <= 1.0 + 1e-6, "fb={fb}");
            }
        }
    }

    #[test]
    fn frequency_change_keeps_phase_continuous() {
        let mut osc = FeedbackOscillator::new(48000.0);
        let a = render(&mut osc, 440.0, 0.0, 4800);
        let b = render(&mut osc, 880.0, 0.0, 4800);
        // No discontinuity: the first sample of the new block continues
        // from the previous block within one cycle step of each rate.
        let max_step = (core::f64::consts::TAU * 880.0 / 48000.0).sin() as f32 + 1e-3;
        let step = (b[0] - a[4799]).abs();
        assert!(step <= max_step * 1.5, "phase jumped by {step}");
    }

    #[test]
    fn phase_stays_bounded_over_long_runs() {
        let mut osc = FeedbackOscillator::new(48000.0);
        for _ in 0..2000 {
            render(&mut osc, 19999.0, 0.3, 128);
        }
        assert!((0.0..1.0).contains(&osc.phase));
    }

    #[test]
    fn reset_restarts_from_zero_phase() {
        let mut osc = FeedbackOscillator::new(48000.0);
        render(&mut osc, 440.0, 0.5, 1000);
        osc.reset();
        let out = render(&mut osc, 440.0, 0.0, 4);
        // sin starts near zero and rises.
        assert!(out[0].abs() < 0.1);
        assert!(out[1] > out[0]);
    }
}
