//! Kernel module registry with deferred availability.
//!
//! Modules are named kernel implementations that may not be loadable the
//! moment a patch asks for them — the canonical flow is a host that
//! registers module loaders up front and marks them resolved when their
//! backing resources arrive. The registry tracks each module's load state
//! ({Unregistered, Loading, Loaded}) and a queue of pending continuations:
//!
//! - [`ModuleRegistry::request`] returns immediately. If the module is
//!   already Loaded the continuation runs synchronously; otherwise it is
//!   queued.
//! - [`ModuleRegistry::resolve`] marks a module Loaded and fires every
//!   queued continuation exactly once, in registration order. Any later
//!   request resolves synchronously.
//!
//! The registry also implements [`ModuleSource`], so a
//! [`Patch`](resona_core::Patch) can spawn nodes against it directly: a
//! known-but-loading module yields a node in `PendingInit` that the patch
//! finishes once the module resolves; an unknown module is logged and
//! yields a disabled stand-in.
//!
//! # Example
//!
//! ```rust
//! use resona_registry::ModuleRegistry;
//! use resona_core::{ModuleSource, Patch};
//!
//! let registry = ModuleRegistry::with_builtins();
//! let mut patch = Patch::new(48000.0, 128);
//! let _filter = patch.spawn(&registry, "svf");
//! assert!(registry.is_loaded("svf"));
//! ```

use std::collections::HashMap;

use resona_core::{Kernel, ModuleDescriptor, ModuleSource};
use resona_kernels::{
    Arithmetic, ArithmeticOp, Crossfade, EnvelopeGenerator, FadeCurve, FdnReverb,
    FeedbackOscillator, RotationMixer2, RotationMixer4, StageSet, StateVariableFilter,
};

/// Factory producing a kernel instance at a sample rate.
pub type KernelFactory = fn(f32) -> Box<dyn Kernel>;

/// Continuation queued against a module's load completion.
pub type Continuation = Box<dyn FnOnce() + Send>;

/// Load state of a module entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Never registered; requests queue until a loader arrives.
    #[default]
    Unregistered,
    /// Registered, awaiting resolution.
    Loading,
    /// Resolved; instantiation and requests are synchronous.
    Loaded,
}

struct ModuleEntry {
    descriptor: Option<ModuleDescriptor>,
    factory: Option<KernelFactory>,
    state: LoadState,
    pending: Vec<Continuation>,
}

impl ModuleEntry {
    fn empty() -> Self {
        Self {
            descriptor: None,
            factory: None,
            state: LoadState::Unregistered,
            pending: Vec::new(),
        }
    }
}

/// Registry of named kernel modules.
pub struct ModuleRegistry {
    entries: HashMap<String, ModuleEntry>,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry with every built-in kernel registered and
    /// resolved — the configuration used when no deferred loading is in
    /// play.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register_builtins();
        let ids: Vec<String> = registry.entries.keys().cloned().collect();
        for id in ids {
            registry.resolve(&id);
        }
        registry
    }

    /// Register every built-in kernel module (in Loading state).
    pub fn register_builtins(&mut self) {
        // Per-sample arithmetic, one module per operator.
        self.register(arithmetic_descriptor("add"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::Add))
        });
        self.register(arithmetic_descriptor("sub"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::Sub))
        });
        self.register(arithmetic_descriptor("mult"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::Mult))
        });
        self.register(arithmetic_descriptor("div"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::Div))
        });
        self.register(arithmetic_descriptor("min"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::Min))
        });
        self.register(arithmetic_descriptor("max"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::Max))
        });
        self.register(arithmetic_descriptor("negate"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::Negate))
        });
        self.register(arithmetic_descriptor("sin"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::Sin))
        });
        self.register(arithmetic_descriptor("cos"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::Cos))
        });
        self.register(arithmetic_descriptor("sin-deg"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::SinDeg))
        });
        self.register(arithmetic_descriptor("cos-deg"), |_| {
            Box::new(Arithmetic::new(ArithmeticOp::CosDeg))
        });

        self.register(
            ModuleDescriptor {
                id: "crossfade",
                name: "Crossfade",
                summary: "Two-input blend with constant-power curve",
                inlets: Crossfade::INLETS,
                outlets: Crossfade::OUTLETS,
                params: Crossfade::PARAMS,
            },
            |_| Box::new(Crossfade::new(FadeCurve::ConstantPower)),
        );

        self.register(
            ModuleDescriptor {
                id: "rotate2",
                name: "Rotation Mixer (2ch)",
                summary: "Energy-conserving 2-channel rotation",
                inlets: RotationMixer2::INLETS,
                outlets: RotationMixer2::OUTLETS,
                params: RotationMixer2::PARAMS,
            },
            |sr| Box::new(RotationMixer2::new(sr)),
        );

        self.register(
            ModuleDescriptor {
                id: "rotate4",
                name: "Rotation Mixer (4ch)",
                summary: "Energy-conserving 4-channel double rotation",
                inlets: RotationMixer4::INLETS,
                outlets: RotationMixer4::OUTLETS,
                params: RotationMixer4::PARAMS,
            },
            |sr| Box::new(RotationMixer4::new(sr)),
        );

        self.register(
            ModuleDescriptor {
                id: "svf",
                name: "State-Variable Filter",
                summary: "ZDF filter with simultaneous LP/HP/BP outputs",
                inlets: StateVariableFilter::INLETS,
                outlets: StateVariableFilter::OUTLETS,
                params: StateVariableFilter::PARAMS,
            },
            |sr| Box::new(StateVariableFilter::new(sr)),
        );

        self.register(
            ModuleDescriptor {
                id: "feedback-osc",
                name: "Feedback Oscillator",
                summary: "Self-modulated sine source",
                inlets: FeedbackOscillator::INLETS,
                outlets: FeedbackOscillator::OUTLETS,
                params: FeedbackOscillator::PARAMS,
            },
            |sr| Box::new(FeedbackOscillator::new(sr)),
        );

        self.register(envelope_descriptor("envelope", "Full ADSR envelope"), |sr| {
            Box::new(EnvelopeGenerator::new(sr, StageSet::Adsr))
        });
        self.register(envelope_descriptor("envelope-ar", "Attack-release envelope"), |sr| {
            Box::new(EnvelopeGenerator::new(sr, StageSet::AttackRelease))
        });
        self.register(
            envelope_descriptor("envelope-asr", "Attack-sustain-release envelope"),
            |sr| Box::new(EnvelopeGenerator::new(sr, StageSet::AttackSustainRelease)),
        );
        self.register(
            envelope_descriptor("envelope-ads", "Attack-decay-sustain envelope"),
            |sr| Box::new(EnvelopeGenerator::new(sr, StageSet::AttackDecaySustain)),
        );

        self.register(
            ModuleDescriptor {
                id: "fdn-reverb",
                name: "FDN Reverb",
                summary: "Four-line feedback delay network reverb",
                inlets: FdnReverb::INLETS,
                outlets: FdnReverb::OUTLETS,
                params: FdnReverb::PARAMS,
            },
            |sr| Box::new(FdnReverb::new(sr)),
        );
    }

    /// Register a module loader. The module enters Loading; queued
    /// requests stay queued until [`resolve`](Self::resolve).
    pub fn register(&mut self, descriptor: ModuleDescriptor, factory: KernelFactory) {
        let entry = self
            .entries
            .entry(descriptor.id.to_string())
            .or_insert_with(ModuleEntry::empty);
        if entry.state == LoadState::Unregistered {
            entry.state = LoadState::Loading;
        }
        entry.descriptor = Some(descriptor);
        entry.factory = Some(factory);
    }

    /// Mark a module Loaded and fire its queued continuations exactly
    /// once, in registration order. Later requests resolve synchronously.
    pub fn resolve(&mut self, id: &str) {
        let Some(entry) = self.entries.get_mut(id) else {
            tracing::warn!(module = id, "resolve for unknown module ignored");
            return;
        };
        if entry.factory.is_none() {
            tracing::warn!(module = id, "resolve before register ignored");
            return;
        }
        if entry.state == LoadState::Loaded {
            return;
        }
        entry.state = LoadState::Loaded;
        let pending = core::mem::take(&mut entry.pending);
        tracing::debug!(module = id, continuations = pending.len(), "module loaded");
        for continuation in pending {
            continuation();
        }
    }

    /// Ask for a module, supplying a continuation to run once it is
    /// Loaded. Returns immediately in every case.
    pub fn request(&mut self, id: &str, continuation: impl FnOnce() + Send + 'static) {
        let entry = self
            .entries
            .entry(id.to_string())
            .or_insert_with(ModuleEntry::empty);
        if entry.state == LoadState::Loaded {
            continuation();
        } else {
            entry.pending.push(Box::new(continuation));
        }
    }

    /// Load state of a module; Unregistered for unknown names.
    pub fn state(&self, id: &str) -> LoadState {
        self.entries.get(id).map_or(LoadState::Unregistered, |e| e.state)
    }

    /// Descriptors of every registered module, for host UIs.
    pub fn descriptors(&self) -> Vec<&ModuleDescriptor> {
        self.entries
            .values()
            .filter_map(|e| e.descriptor.as_ref())
            .collect()
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.descriptor.is_some())
            .count()
    }

    /// True when no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModuleSource for ModuleRegistry {
    fn descriptor(&self, id: &str) -> Option<&ModuleDescriptor> {
        self.entries.get(id).and_then(|e| e.descriptor.as_ref())
    }

    fn is_loaded(&self, id: &str) -> bool {
        self.state(id) == LoadState::Loaded
    }

    fn instantiate(&self, id: &str, sample_rate: f32) -> Option<Box<dyn Kernel>> {
        let entry = self.entries.get(id)?;
        if entry.state != LoadState::Loaded {
            tracing::warn!(module = id, "instantiate before load");
            return None;
        }
        entry.factory.map(|f| f(sample_rate))
    }
}

fn arithmetic_descriptor(id: &'static str) -> ModuleDescriptor {
    ModuleDescriptor {
        id,
        name: "Signal Arithmetic",
        summary: "Per-sample operator over two accumulation inputs",
        inlets: Arithmetic::INLETS,
        outlets: Arithmetic::OUTLETS,
        params: &[],
    }
}

fn envelope_descriptor(id: &'static str, summary: &'static str) -> ModuleDescriptor {
    ModuleDescriptor {
        id,
        name: "Envelope Generator",
        summary,
        inlets: EnvelopeGenerator::INLETS,
        outlets: EnvelopeGenerator::OUTLETS,
        params: EnvelopeGenerator::PARAMS,
    }
}
