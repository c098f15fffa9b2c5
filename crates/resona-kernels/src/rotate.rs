//! Energy-conserving rotation mixers.
//!
//! An orthonormal rotation redistributes energy between channels without
//! creating or destroying any: for every angle, the sum of squared outputs
//! equals the sum of squared inputs. Inside a feedback delay network this
//! matters structurally — the loop gain is then governed solely by the
//! explicit decay parameter, never amplified by the mixing stage.
//!
//! The 4-channel form composes two rotation layers: pairs (0,1) and (2,3)
//! by `angle`, then the cross pairs (r0,r2) and (r1,r3) by `cross`. A
//! composition of orthonormal rotations is orthonormal.

use libm::{cosf, sinf};
use resona_core::{
    BlockIo, Kernel, ParamBlocks, ParamDescriptor, ParamRate, RenderContext, Slew, sample_held,
};

const TAU: f32 = core::f32::consts::TAU;

/// Angle slew bound in radians per millisecond; a full-circle sweep takes
/// about 300 ms, fast enough to feel immediate and slow enough to keep a
/// feedback loop from stepping.
const ANGLE_SLEW_PER_MS: f32 = 0.02;

/// Rotate the pair `(a, b)` by `theta`.
#[inline]
pub fn rotate_pair(a: f32, b: f32, theta: f32) -> (f32, f32) {
    let (sin, cos) = (sinf(theta), cosf(theta));
    (a * cos - b * sin, a * sin + b * cos)
}

/// Two-channel rotation mixer with one slewed angle.
#[derive(Debug, Clone)]
pub struct RotationMixer2 {
    angle: Slew,
    sample_rate: f32,
}

impl RotationMixer2 {
    /// Inlet names.
    pub const INLETS: &'static [&'static str] = &["a", "b"];
    /// Outlet names.
    pub const OUTLETS: &'static [&'static str] = &["a", "b"];
    /// Parameter table.
    pub const PARAMS: &'static [ParamDescriptor] =
        &[ParamDescriptor::new("angle", -TAU, TAU, 0.0, ParamRate::KRate)];

    /// Create a 2-channel mixer.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            angle: Slew::new(0.0),
            sample_rate,
        }
    }
}

impl Kernel for RotationMixer2 {
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
        let target = sample_held(params.get(0), 0);
        for i in 0..ctx.frames {
            let theta = self.angle.next(target, ANGLE_SLEW_PER_MS, self.sample_rate);
            let a = io.input(0).get(i).copied().unwrap_or(0.0);
            let b = io.input(1).get(i).copied().unwrap_or(0.0);
            let (out_a, out_b) = rotate_pair(a, b, theta);
            io.outputs[0][i] = out_a;
            io.outputs[1][i] = out_b;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.angle.snap(0.0);
    }
}

/// Four-channel rotation mixer composing two slewed rotation layers.
#[derive(Debug, Clone)]
pub struct RotationMixer4 {
    angle: Slew,
    cross: Slew,
    sample_rate: f32,
}

impl RotationMixer4 {
    /// Inlet names.
    pub const INLETS: &'static [&'static str] = &["a", "b", "c", "d"];
    /// Outlet names.
    pub const OUTLETS: &'static [&'static str] = &["a", "b", "c", "d"];
    /// Parameter table.
    pub const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("angle", -TAU, TAU, 0.0, ParamRate::KRate),
        ParamDescriptor::new("cross", -TAU, TAU, 0.0, ParamRate::KRate),
    ];

    /// Create a 4-channel mixer.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            angle: Slew::new(0.0),
            cross: Slew::new(0.0),
            sample_rate,
        }
    }
}

/// One sample of the 4-channel double rotation.
#[inline]
pub fn rotate_quad(input: [f32; 4], theta: f32, iota: f32) -> [f32; 4] {
    let (r0, r1) = rotate_pair(input[0], input[1], theta);
    let (r2, r3) = rotate_pair(input[2], input[3], theta);
    let (o0, o2) = rotate_pair(r0, r2, iota);
    let (o1, o3) = rotate_pair(r1, r3, iota);
    [o0, o1, o2, o3]
}

impl Kernel for RotationMixer4 {
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
        let angle_target = sample_held(params.get(0), 0);
        let cross_target = sample_held(params.get(1), 0);
        for i in 0..ctx.frames {
            let theta = self
                .angle
                .next(angle_target, ANGLE_SLEW_PER_MS, self.sample_rate);
            let iota = self
                .cross
                .next(cross_target, ANGLE_SLEW_PER_MS, self.sample_rate);
            let mut input = [0.0f32; 4];
            for (ch, value) in input.iter_mut().enumerate() {
                *value = io.input(ch).get(i).copied().unwrap_or(0.0);
            }
            let output = rotate_quad(input, theta, iota);
            for (ch, value) in output.iter().enumerate() {
                io.outputs[ch][i] = *value;
            }
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.angle.snap(0.0);
        self.cross.snap(0.0);
    }
}
