//! Resona core — kernel contract, parameter machinery, and patch runtime.
//!
//! This crate provides the foundation a real-time signal-processing graph
//! is built from, designed for zero allocation and no error propagation in
//! the render path.
//!
//! # Core Abstractions
//!
//! ## Kernel contract
//!
//! - [`Kernel`] — object-safe block renderer over named ports and declared
//!   parameters
//! - [`ModuleSource`] / [`ModuleDescriptor`] — the seam through which a
//!   registry or host primitive provider supplies kernels by name
//!
//! ## Parameter machinery
//!
//! - [`ParamDescriptor`] — name, range, default, a-rate/k-rate granularity,
//!   normalization scale
//! - [`ParamSet`] — owned, clamped, named parameter storage per node
//! - [`sample_held`] — safe per-block array sampling (a-rate and k-rate
//!   through one code path)
//! - [`Slew`] — rate-limited control smoothing
//! - [`SmoothedParam`] — one-pole exponential smoothing
//!
//! ## Patch runtime
//!
//! - [`Patch`] — ports, connection protocol, lifecycle, deferred init,
//!   visualization taps, block rendering
//!
//! ## Signal primitives
//!
//! - [`DelayLine`], [`OnePole`], [`Lfo`] and the helpers in [`math`] —
//!   the fixed operators reverberant topologies are assembled from
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation, locking, or panicking in
//!   [`Kernel::render`] or [`Patch::render_block`]
//! - **Silence over failure**: structural errors are logged on the control
//!   plane and degrade to silence on the render plane
//! - **`libm` for math**: render-plane transcendentals never depend on
//!   platform libc behavior

pub mod delay;
pub mod graph;
pub mod kernel;
pub mod lfo;
pub mod math;
pub mod one_pole;
pub mod params;
pub mod smooth;

pub use delay::DelayLine;
pub use graph::{EdgeId, Lifecycle, NodeId, Patch, PatchError, TapId};
pub use kernel::{
    BlockIo, DEFAULT_BLOCK_LEN, Kernel, ModuleDescriptor, ModuleSource, ParamBlocks, RenderContext,
};
pub use lfo::Lfo;
pub use math::{flush_denormal, lerp, soft_clip};
pub use one_pole::OnePole;
pub use params::{ParamDescriptor, ParamRate, ParamScale, ParamSet};
pub use smooth::{sample_held, SmoothedParam, Slew};
