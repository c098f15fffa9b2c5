//! The patch: graph mutation API and per-block render loop.
//!
//! Control-plane code builds a topology by connecting node ports, then the
//! hosting engine pulls fixed-size blocks through [`Patch::render_block`]
//! once per cycle. Mutation (connect, disconnect, spawn, module
//! resolution) happens exclusively on the control plane and never races an
//! in-flight block; the render loop itself performs no allocation and no
//! error propagation — a misconfigured graph renders silence, it does not
//! crash.
//!
//! Connections are rejected, logged, and left unmade when the source has
//! no outlet, the destination port does not exist, or the edge would close
//! a cycle; the graph is never left half-mutated.

use std::collections::VecDeque;

use thiserror::Error;

use crate::kernel::{BlockIo, Kernel, ModuleSource, ParamBlocks, RenderContext};
use crate::params::{ParamDescriptor, ParamRate, ParamSet};

use super::node::{
    Edge, EdgeId, InitCell, KernelSlot, Lifecycle, NodeData, NodeId, PortKind, Role, TapId,
};

static MONO_IN: &[&str] = &["in"];
static MONO_OUT: &[&str] = &["out"];
static NO_PORTS: &[&str] = &[];
static NO_PARAMS: &[ParamDescriptor] = &[];

/// Errors from control-plane graph mutation.
///
/// These never cross the render boundary; [`Patch::connect`] and friends
/// swallow them into `None` plus a log line, matching the contract that a
/// misconfigured graph degrades to silence rather than failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// The referenced node does not exist (or was removed).
    #[error("{0} not found")]
    NodeNotFound(NodeId),
    /// The source node has no such outlet to connect from.
    #[error("{0} has no outlet {1}")]
    NoOutlet(NodeId, usize),
    /// The destination node has no such inlet.
    #[error("{node} has no inlet {inlet}")]
    NoSuchInlet {
        /// Destination node.
        node: NodeId,
        /// Requested inlet index.
        inlet: usize,
    },
    /// The destination node declares no such parameter.
    #[error("{node} has no parameter `{name}`")]
    NoSuchParam {
        /// Destination node.
        node: NodeId,
        /// Requested parameter name.
        name: String,
    },
    /// The edge would close a feedback cycle in the outer graph.
    #[error("connection would create a cycle")]
    CycleDetected,
}

struct Tap {
    node: NodeId,
    outlet: usize,
    callback: Box<dyn FnMut(&[f32]) + Send>,
}

/// A graph of signal-processing nodes rendered in fixed-size blocks.
pub struct Patch {
    nodes: Vec<Option<NodeData>>,
    edges: Vec<Option<Edge>>,
    /// Topological render order, recomputed at mutation time.
    order: Vec<NodeId>,
    /// All outlet blocks, indexed by each node's `outlet_base`.
    outlet_pool: Vec<Vec<f32>>,
    taps: Vec<Option<Tap>>,
    sample_rate: f32,
    block_len: usize,
}

impl Patch {
    /// Create an empty patch.
    ///
    /// `block_len` is the fixed frame count per render block
    /// ([`DEFAULT_BLOCK_LEN`](crate::kernel::DEFAULT_BLOCK_LEN) in the
    /// usual configuration).
    pub fn new(sample_rate: f32, block_len: usize) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            order: Vec::new(),
            outlet_pool: Vec::new(),
            taps: Vec::new(),
            sample_rate,
            block_len,
        }
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Frames per render block.
    pub fn block_len(&self) -> usize {
        self.block_len
    }

    // ------------------------------------------------------------------
    // Node construction
    // ------------------------------------------------------------------

    /// Add an external-audio entry point (one outlet, no inlets).
    ///
    /// The host stages a block with [`write_source`](Self::write_source)
    /// before each render cycle.
    pub fn add_source(&mut self) -> NodeId {
        self.insert_node(
            "source".into(),
            Role::Source {
                staged: vec![0.0; self.block_len],
            },
            NO_PORTS,
            MONO_OUT,
            NO_PARAMS,
            Lifecycle::Initialized,
            true,
        )
    }

    /// Add an external-audio exit point (one inlet, no outlets).
    pub fn add_sink(&mut self) -> NodeId {
        self.insert_node(
            "sink".into(),
            Role::Sink,
            MONO_IN,
            NO_PORTS,
            NO_PARAMS,
            Lifecycle::Initialized,
            true,
        )
    }

    /// Add a node around an already-constructed kernel.
    ///
    /// The kernel is told the patch sample rate and becomes immediately
    /// initialized.
    pub fn add_kernel(&mut self, kind: &str, mut kernel: Box<dyn Kernel>) -> NodeId {
        kernel.set_sample_rate(self.sample_rate);
        let inlets = kernel.inlets();
        let outlets = kernel.outlets();
        let params = kernel.params();
        self.insert_node(
            kind.into(),
            Role::Kernel(KernelSlot::Ready(kernel)),
            inlets,
            outlets,
            params,
            Lifecycle::Initialized,
            true,
        )
    }

    /// Add a node backed by a named kernel module.
    ///
    /// If the module is loaded the node initializes synchronously. If it
    /// is known but still loading, the node's ports and parameters come
    /// from the module descriptor and the kernel attaches later through
    /// [`finish_pending`](Self::finish_pending); until then the node
    /// renders silence. An unknown module logs and yields a disabled
    /// stand-in that renders silence forever.
    pub fn spawn(&mut self, source: &dyn ModuleSource, id: &str) -> NodeId {
        let Some(desc) = source.descriptor(id) else {
            tracing::warn!(module = id, "unknown module, inserting disabled stand-in");
            return self.insert_node(
                id.into(),
                Role::Kernel(KernelSlot::Disabled),
                MONO_IN,
                MONO_OUT,
                NO_PARAMS,
                Lifecycle::Initialized,
                true,
            );
        };
        let (inlets, outlets, params) = (desc.inlets, desc.outlets, desc.params);

        if source.is_loaded(id) {
            match source.instantiate(id, self.sample_rate) {
                Some(kernel) => self.insert_node(
                    id.into(),
                    Role::Kernel(KernelSlot::Ready(kernel)),
                    inlets,
                    outlets,
                    params,
                    Lifecycle::Initialized,
                    true,
                ),
                None => {
                    tracing::warn!(module = id, "loaded module failed to instantiate");
                    self.insert_node(
                        id.into(),
                        Role::Kernel(KernelSlot::Disabled),
                        inlets,
                        outlets,
                        params,
                        Lifecycle::Initialized,
                        true,
                    )
                }
            }
        } else {
            tracing::debug!(module = id, "module not loaded, node pending init");
            self.insert_node(
                id.into(),
                Role::Kernel(KernelSlot::Pending { module: id.into() }),
                inlets,
                outlets,
                params,
                Lifecycle::PendingInit,
                false,
            )
        }
    }

    /// Attach kernels to pending nodes whose modules have since loaded,
    /// firing each node's init continuations exactly once.
    pub fn finish_pending(&mut self, source: &dyn ModuleSource) {
        let sample_rate = self.sample_rate;
        let mut fired: Vec<Box<dyn FnOnce() + Send>> = Vec::new();

        for slot in &mut self.nodes {
            let Some(node) = slot else { continue };
            let Role::Kernel(kernel_slot) = &mut node.role else {
                continue;
            };
            let KernelSlot::Pending { module } = kernel_slot else {
                continue;
            };
            if !source.is_loaded(module) {
                continue;
            }
            match source.instantiate(module, sample_rate) {
                Some(kernel) => {
                    tracing::debug!(node = %node.id, module = %module, "deferred init complete");
                    *kernel_slot = KernelSlot::Ready(kernel);
                }
                None => {
                    tracing::warn!(node = %node.id, module = %module, "module resolved but failed to instantiate");
                    *kernel_slot = KernelSlot::Disabled;
                }
            }
            node.lifecycle = Lifecycle::Initialized;
            fired.extend(node.init.fire());
        }

        // Run continuations after the node borrows are released.
        for f in fired {
            f();
        }
    }

    /// Subscribe to a node's initialization.
    ///
    /// Fires immediately when the node is already initialized, otherwise
    /// once when its deferred init completes. Use this before touching
    /// kernel-specific state on a module-backed node.
    pub fn on_init(&mut self, node: NodeId, f: impl FnOnce() + Send + 'static) {
        if let Some(n) = self.node_mut(node) {
            n.init.subscribe(Box::new(f));
        }
    }

    /// Lifecycle state of a node.
    pub fn lifecycle(&self, node: NodeId) -> Option<Lifecycle> {
        self.node(node).map(|n| n.lifecycle)
    }

    /// Kind string the node was created with.
    pub fn kind(&self, node: NodeId) -> Option<&str> {
        self.node(node).map(|n| n.kind.as_str())
    }

    /// Inlet names of a node, in port order.
    pub fn inlets(&self, node: NodeId) -> &'static [&'static str] {
        self.node(node).map_or(NO_PORTS, |n| n.inlet_names)
    }

    /// Outlet names of a node, in port order.
    pub fn outlets(&self, node: NodeId) -> &'static [&'static str] {
        self.node(node).map_or(NO_PORTS, |n| n.outlet_names)
    }

    /// Remove a node and every edge touching it.
    pub fn remove(&mut self, node: NodeId) {
        let idx = node.0 as usize;
        if self.nodes.get(idx).is_none_or(Option::is_none) {
            return;
        }
        for slot in &mut self.edges {
            if slot.as_ref().is_some_and(|e| e.from == node || e.to == node) {
                *slot = None;
            }
        }
        let edges = &self.edges;
        for other in self.nodes.iter_mut().flatten() {
            other
                .incoming
                .retain(|&eid| edges.get(eid.0 as usize).is_some_and(Option::is_some));
            other
                .outgoing
                .retain(|&eid| edges.get(eid.0 as usize).is_some_and(Option::is_some));
        }
        for tap in &mut self.taps {
            if tap.as_ref().is_some_and(|t| t.node == node) {
                *tap = None;
            }
        }
        self.nodes[idx] = None;
        self.recompute_order();
    }

    // ------------------------------------------------------------------
    // Connection protocol
    // ------------------------------------------------------------------

    /// Connect outlet 0 of `from` to inlet 0 of `to`.
    ///
    /// Returns the downstream node on success, enabling chained wiring;
    /// `None` (with a log line, graph unchanged) on rejection.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Option<NodeId> {
        self.connect_ports(from, 0, to, 0)
    }

    /// Connect a specific outlet to a specific inlet.
    pub fn connect_ports(
        &mut self,
        from: NodeId,
        outlet: usize,
        to: NodeId,
        inlet: usize,
    ) -> Option<NodeId> {
        match self.try_connect_ports(from, outlet, to, inlet) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!("connect rejected: {err}");
                None
            }
        }
    }

    /// Connect an outlet additively into a control parameter: the
    /// parameter's automated value and the incoming signal sum. Returns
    /// the *source* node on success, so signal wiring can continue from
    /// it.
    pub fn connect_param(
        &mut self,
        from: NodeId,
        outlet: usize,
        to: NodeId,
        param: &str,
    ) -> Option<NodeId> {
        match self.try_connect_param(from, outlet, to, param) {
            Ok(id) => Some(id),
            Err(err) => {
                tracing::warn!("connect rejected: {err}");
                None
            }
        }
    }

    /// Typed-error variant of [`connect_ports`](Self::connect_ports).
    pub fn try_connect_ports(
        &mut self,
        from: NodeId,
        outlet: usize,
        to: NodeId,
        inlet: usize,
    ) -> Result<NodeId, PatchError> {
        let src = self.node(from).ok_or(PatchError::NodeNotFound(from))?;
        if outlet >= src.outlet_count() {
            return Err(PatchError::NoOutlet(from, outlet));
        }
        let from_slot = src.outlet_base + outlet;
        let dst = self.node(to).ok_or(PatchError::NodeNotFound(to))?;
        if inlet >= dst.inlet_count() {
            return Err(PatchError::NoSuchInlet { node: to, inlet });
        }
        if self.would_cycle(from, to) {
            return Err(PatchError::CycleDetected);
        }
        self.insert_edge(Edge {
            from,
            from_outlet: outlet,
            from_slot,
            to,
            to_port: PortKind::Inlet(inlet),
        });
        Ok(to)
    }

    /// Typed-error variant of [`connect_param`](Self::connect_param).
    pub fn try_connect_param(
        &mut self,
        from: NodeId,
        outlet: usize,
        to: NodeId,
        param: &str,
    ) -> Result<NodeId, PatchError> {
        let src = self.node(from).ok_or(PatchError::NodeNotFound(from))?;
        if outlet >= src.outlet_count() {
            return Err(PatchError::NoOutlet(from, outlet));
        }
        let from_slot = src.outlet_base + outlet;
        let dst = self.node(to).ok_or(PatchError::NodeNotFound(to))?;
        let index = dst
            .params
            .index_of(param)
            .ok_or_else(|| PatchError::NoSuchParam {
                node: to,
                name: param.into(),
            })?;
        if self.would_cycle(from, to) {
            return Err(PatchError::CycleDetected);
        }
        self.insert_edge(Edge {
            from,
            from_outlet: outlet,
            from_slot,
            to,
            to_port: PortKind::Param(index),
        });
        Ok(from)
    }

    /// Remove one outgoing edge set (`to = Some`) or all outgoing edges
    /// (`to = None`) of a node.
    pub fn disconnect(&mut self, from: NodeId, to: Option<NodeId>) {
        let removed: Vec<EdgeId> = self
            .edges
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let edge = slot.as_ref()?;
                (edge.from == from && to.is_none_or(|t| edge.to == t)).then_some(EdgeId(i as u32))
            })
            .collect();
        for eid in &removed {
            self.edges[eid.0 as usize] = None;
        }
        for node in self.nodes.iter_mut().flatten() {
            node.incoming.retain(|eid| !removed.contains(eid));
            node.outgoing.retain(|eid| !removed.contains(eid));
        }
        self.recompute_order();
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Write a parameter value, clamped to its declared range.
    ///
    /// Returns `false` (and logs) for an unknown node or parameter name.
    pub fn set_param(&mut self, node: NodeId, name: &str, value: f32) -> bool {
        match self.node_mut(node) {
            Some(n) => {
                let ok = n.params.set(name, value);
                if !ok {
                    tracing::warn!(%node, param = name, "ignoring write to unknown parameter");
                }
                ok
            }
            None => false,
        }
    }

    /// Write a normalized [0, 1] value mapped through the parameter's
    /// declared scale.
    pub fn set_param_normalized(&mut self, node: NodeId, name: &str, normalized: f32) -> bool {
        match self.node_mut(node) {
            Some(n) => n.params.set_normalized(name, normalized),
            None => false,
        }
    }

    /// Current value of a parameter; 0 for unknown names.
    pub fn param(&self, node: NodeId, name: &str) -> f32 {
        self.node(node).map_or(0.0, |n| n.params.get(name))
    }

    /// Parameter table of a node.
    pub fn param_descriptors(&self, node: NodeId) -> &'static [ParamDescriptor] {
        self.node(node).map_or(NO_PARAMS, |n| n.params.descriptors())
    }

    // ------------------------------------------------------------------
    // External audio and observation
    // ------------------------------------------------------------------

    /// Stage the next block of external input on a source node.
    ///
    /// Frames beyond the staged slice (or the block length) are zeroed.
    pub fn write_source(&mut self, node: NodeId, frames: &[f32]) {
        if let Some(n) = self.node_mut(node)
            && let Role::Source { staged } = &mut n.role
        {
            let count = frames.len().min(staged.len());
            staged[..count].copy_from_slice(&frames[..count]);
            staged[count..].fill(0.0);
        }
    }

    /// The summed inlet block of a sink node from the last rendered cycle.
    pub fn sink_frames(&self, node: NodeId) -> &[f32] {
        match self.node(node) {
            Some(n) if matches!(n.role, Role::Sink) && !n.inlet_bufs.is_empty() => {
                &n.inlet_bufs[0]
            }
            _ => &[],
        }
    }

    /// The block a node's outlet produced in the last rendered cycle.
    pub fn outlet(&self, node: NodeId, outlet: usize) -> &[f32] {
        match self.node(node) {
            Some(n) if outlet < n.outlet_count() => &self.outlet_pool[n.outlet_base + outlet],
            _ => &[],
        }
    }

    /// Attach a read-only visualization tap to an outlet.
    ///
    /// The callback runs on the render plane immediately after the node
    /// renders, with the outlet block as a read-only slice; it must be
    /// cheap and must not block.
    pub fn tap(
        &mut self,
        node: NodeId,
        outlet: usize,
        callback: impl FnMut(&[f32]) + Send + 'static,
    ) -> Option<TapId> {
        let n = self.node(node)?;
        if outlet >= n.outlet_count() {
            tracing::warn!(%node, outlet, "tap rejected: no such outlet");
            return None;
        }
        let id = TapId(self.taps.len() as u32);
        self.taps.push(Some(Tap {
            node,
            outlet,
            callback: Box::new(callback),
        }));
        Some(id)
    }

    /// Detach a visualization tap.
    pub fn remove_tap(&mut self, tap: TapId) {
        if let Some(slot) = self.taps.get_mut(tap.0 as usize) {
            *slot = None;
        }
    }

    // ------------------------------------------------------------------
    // Render plane
    // ------------------------------------------------------------------

    /// Pull one block through the graph.
    ///
    /// Runs every node in topological order: sums fan-in into inlets,
    /// assembles per-block parameter arrays (automated value plus any
    /// signal wired into the parameter), renders the kernel, then feeds
    /// the taps. No allocation, no locks, no panics.
    pub fn render_block(&mut self) {
        let ctx = RenderContext {
            sample_rate: self.sample_rate,
            frames: self.block_len,
        };
        let Self {
            nodes,
            edges,
            order,
            outlet_pool,
            taps,
            ..
        } = self;

        for &nid in order.iter() {
            let Some(node) = nodes.get_mut(nid.0 as usize).and_then(Option::as_mut) else {
                continue;
            };

            // Fan-in: zero inlets, stage parameter values, sum edges.
            for buf in &mut node.inlet_bufs {
                buf.fill(0.0);
            }
            for j in 0..node.params.len() {
                let v = node.params.value(j);
                node.param_bufs[j].fill(v);
            }
            for &eid in &node.incoming {
                let Some(edge) = edges.get(eid.0 as usize).and_then(Option::as_ref) else {
                    continue;
                };
                let src = &outlet_pool[edge.from_slot];
                match edge.to_port {
                    PortKind::Inlet(i) => {
                        for (dst, s) in node.inlet_bufs[i].iter_mut().zip(src) {
                            *dst += s;
                        }
                    }
                    PortKind::Param(j) => {
                        let buf = &mut node.param_bufs[j];
                        if buf.len() == 1 {
                            buf[0] += src.first().copied().unwrap_or(0.0);
                        } else {
                            for (dst, s) in buf.iter_mut().zip(src) {
                                *dst += s;
                            }
                        }
                    }
                }
            }

            // Render into this node's outlet slots.
            let base = node.outlet_base;
            let count = node.outlet_count();
            let outs = &mut outlet_pool[base..base + count];
            match &mut node.role {
                Role::Source { staged } => {
                    if let Some(out) = outs.first_mut() {
                        out.copy_from_slice(staged);
                    }
                }
                Role::Sink => {}
                Role::Kernel(KernelSlot::Ready(kernel)) => {
                    let params = ParamBlocks::new(&node.param_bufs);
                    let mut io = BlockIo {
                        inputs: &node.inlet_bufs,
                        outputs: outs,
                    };
                    kernel.render(&ctx, &mut io, &params);
                }
                Role::Kernel(_) => {
                    for out in outs.iter_mut() {
                        out.fill(0.0);
                    }
                }
            }

            // Read-only observation.
            for tap in taps.iter_mut().flatten() {
                if tap.node == nid && tap.outlet < count {
                    (tap.callback)(&outlet_pool[base + tap.outlet]);
                }
            }
        }
    }

    /// Clear every kernel's history (filter state, delay contents, phase)
    /// without touching parameters or topology.
    pub fn reset(&mut self) {
        for node in self.nodes.iter_mut().flatten() {
            if let Role::Kernel(KernelSlot::Ready(kernel)) = &mut node.role {
                kernel.reset();
            }
        }
        for buf in &mut self.outlet_pool {
            buf.fill(0.0);
        }
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    #[allow(clippy::too_many_arguments)]
    fn insert_node(
        &mut self,
        kind: String,
        role: Role,
        inlets: &'static [&'static str],
        outlets: &'static [&'static str],
        params: &'static [ParamDescriptor],
        lifecycle: Lifecycle,
        init_fired: bool,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let block_len = self.block_len;
        let outlet_base = self.outlet_pool.len();
        for _ in 0..outlets.len() {
            self.outlet_pool.push(vec![0.0; block_len]);
        }
        let param_bufs = params
            .iter()
            .map(|d| match d.rate {
                ParamRate::KRate => vec![d.default; 1],
                ParamRate::ARate => vec![d.default; block_len],
            })
            .collect();
        self.nodes.push(Some(NodeData {
            id,
            kind,
            role,
            lifecycle,
            init: InitCell::new(init_fired),
            params: ParamSet::new(params),
            inlet_names: inlets,
            outlet_names: outlets,
            inlet_bufs: (0..inlets.len()).map(|_| vec![0.0; block_len]).collect(),
            param_bufs,
            outlet_base,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        }));
        self.recompute_order();
        id
    }

    fn insert_edge(&mut self, edge: Edge) {
        let eid = EdgeId(self.edges.len() as u32);
        let (from, to) = (edge.from, edge.to);
        self.edges.push(Some(edge));
        if let Some(n) = self.node_mut(from) {
            n.outgoing.push(eid);
        }
        if let Some(n) = self.node_mut(to) {
            n.incoming.push(eid);
        }
        self.recompute_order();
    }

    /// True when an edge `from -> to` would close a cycle, i.e. `from` is
    /// already reachable from `to` along existing edges.
    fn would_cycle(&self, from: NodeId, to: NodeId) -> bool {
        if from == to {
            return true;
        }
        let mut stack = vec![to];
        let mut seen = vec![false; self.nodes.len()];
        while let Some(current) = stack.pop() {
            if current == from {
                return true;
            }
            let idx = current.0 as usize;
            if seen[idx] {
                continue;
            }
            seen[idx] = true;
            if let Some(node) = self.node(current) {
                for &eid in &node.outgoing {
                    if let Some(edge) = self.edges.get(eid.0 as usize).and_then(Option::as_ref) {
                        stack.push(edge.to);
                    }
                }
            }
        }
        false
    }

    /// Kahn's algorithm over the live nodes and edges.
    fn recompute_order(&mut self) {
        let n = self.nodes.len();
        let mut indegree = vec![0usize; n];
        for edge in self.edges.iter().flatten() {
            indegree[edge.to.0 as usize] += 1;
        }

        let mut queue: VecDeque<usize> = (0..n)
            .filter(|&i| self.nodes[i].is_some() && indegree[i] == 0)
            .collect();
        self.order.clear();

        while let Some(i) = queue.pop_front() {
            self.order.push(NodeId(i as u32));
            let Some(node) = self.nodes[i].as_ref() else {
                continue;
            };
            for &eid in &node.outgoing {
                if let Some(edge) = self.edges.get(eid.0 as usize).and_then(Option::as_ref) {
                    let t = edge.to.0 as usize;
                    indegree[t] -= 1;
                    if indegree[t] == 0 && self.nodes[t].is_some() {
                        queue.push_back(t);
                    }
                }
            }
        }

        // Connect-time cycle rejection keeps this exhaustive; if a stale
        // edge ever slips through, keep rendering the remainder anyway.
        if self.order.len() < self.nodes.iter().flatten().count() {
            for (i, slot) in self.nodes.iter().enumerate() {
                let id = NodeId(i as u32);
                if slot.is_some() && !self.order.contains(&id) {
                    self.order.push(id);
                }
            }
        }
    }
}
