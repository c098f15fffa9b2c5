//! Node/port graph runtime.
//!
//! The patch graph holds composable signal-processing nodes behind one
//! interface — inlets, outlets, connect/disconnect, lifecycle, init
//! notification — regardless of whether a node wraps a built-in kernel, a
//! host-supplied primitive, or a module still loading. Topology is mutated
//! on the control plane and rendered block-by-block on the render plane;
//! the two never race because mutation is forbidden while a block is in
//! flight.

mod node;
mod patch;

pub use node::{EdgeId, Lifecycle, NodeId, TapId};
pub use patch::{Patch, PatchError};
