//! Resona kernels — the DSP units behind the patch graph.
//!
//! Every kernel implements [`resona_core::Kernel`]: block-based render
//! over named mono ports plus declared parameters, no allocation and no
//! panics in the render path.
//!
//! # Kernels
//!
//! - [`Arithmetic`] — per-sample binary/unary operator (add, sub, mult,
//!   guarded div, min, max, negate, sin/cos in radians or degrees)
//! - [`Crossfade`] — two-input blend with linear, smoothstep, or
//!   constant-power curves
//! - [`RotationMixer2`] / [`RotationMixer4`] — energy-conserving
//!   orthonormal rotation mixing with slewed angles
//! - [`StateVariableFilter`] — zero-delay-feedback SVF with simultaneous
//!   lowpass/highpass/bandpass outputs
//! - [`FeedbackOscillator`] — self-modulated sine with bounded `f64`
//!   phase accumulation
//! - [`EnvelopeGenerator`] — gate-driven ADSR family with configurable
//!   stage sets and shape-controlled exponential stages
//! - [`FdnReverb`] — four-line feedback delay network over the rotation
//!   mixer
//!
//! [`EffectInsert`] wires any wet chain behind a crossfade as a dry/wet
//! insert with a single `mix` control.

pub mod arithmetic;
pub mod crossfade;
pub mod effect;
pub mod envelope;
pub mod feedback_osc;
pub mod reverb;
pub mod rotate;
pub mod svf;

pub use arithmetic::{Arithmetic, ArithmeticOp};
pub use crossfade::{Crossfade, FadeCurve};
pub use effect::EffectInsert;
pub use envelope::{EnvelopeGenerator, Stage, StageSet};
pub use feedback_osc::FeedbackOscillator;
pub use reverb::FdnReverb;
pub use rotate::{RotationMixer2, RotationMixer4, rotate_pair, rotate_quad};
pub use svf::StateVariableFilter;
