//! Two-input crossfade with selectable blend curve.
//!
//! The blending stage behind every dry/wet effect composition. The mix
//! parameter is a-rate and clamped to [0, 1] before the curve is applied,
//! whatever the curve.

use libm::{cosf, sinf};
use resona_core::{
    BlockIo, Kernel, ParamBlocks, ParamDescriptor, ParamRate, RenderContext, sample_held,
};

const HALF_PI: f32 = core::f32::consts::FRAC_PI_2;

/// Blend curve of a [`Crossfade`] kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FadeCurve {
    /// `a + t(b - a)`
    #[default]
    Linear,
    /// Linear blend driven by `t²(3 - 2t)` — eases both ends.
    Smoothstep,
    /// `a·cos(tπ/2) + b·sin(tπ/2)` — constant perceived loudness for
    /// uncorrelated signals.
    ConstantPower,
}

/// Two inputs, one output, one a-rate `mix` parameter.
#[derive(Debug, Clone)]
pub struct Crossfade {
    curve: FadeCurve,
}

impl Crossfade {
    /// Inlet names.
    pub const INLETS: &'static [&'static str] = &["a", "b"];
    /// Outlet names.
    pub const OUTLETS: &'static [&'static str] = &["out"];
    /// Parameter table.
    pub const PARAMS: &'static [ParamDescriptor] =
        &[ParamDescriptor::new("mix", 0.0, 1.0, 0.5, ParamRate::ARate)];

    /// Create a crossfade with the given curve.
    pub fn new(curve: FadeCurve) -> Self {
        Self { curve }
    }

    /// The configured curve.
    pub fn curve(&self) -> FadeCurve {
        self.curve
    }

    #[inline]
    fn blend(curve: FadeCurve, a: f32, b: f32, t: f32) -> f32 {
        match curve {
            FadeCurve::Linear => a + t * (b - a),
            FadeCurve::Smoothstep => {
                let t2 = t * t * (3.0 - 2.0 * t);
                a + t2 * (b - a)
            }
            FadeCurve::ConstantPower => a * cosf(t * HALF_PI) + b * sinf(t * HALF_PI),
        }
    }
}

impl Kernel for Crossfade {
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
        let curve = self.curve;
        let mix = params.get(0);
        for i in 0..ctx.frames {
            let a = io.input(0).get(i).copied().unwrap_or(0.0);
            let b = io.input(1).get(i).copied().unwrap_or(0.0);
            let t = sample_held(mix, i).clamp(0.0, 1.0);
            io.outputs[0][i] = Self::blend(curve, a, b, t);
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}
