//! Integration tests for the patch runtime: connection protocol, fan-in,
//! parameter wiring, deferred initialization, and taps.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use resona_core::{
    BlockIo, Kernel, Lifecycle, ModuleDescriptor, ModuleSource, ParamBlocks, ParamDescriptor,
    ParamRate, Patch, PatchError, RenderContext, sample_held,
};

const SR: f32 = 48000.0;
const BLOCK: usize = 128;

/// 1-in/1-out gain used as the workhorse test kernel.
struct Gain(f32);

impl Kernel for Gain {
    fn inlets(&self) -> &'static [&'static str] {
        &["in"]
    }
    fn outlets(&self) -> &'static [&'static str] {
        &["out"]
    }
    fn render(&mut self, ctx: &RenderContext, io: &mut BlockIo<'_>, _: &ParamBlocks<'_>) {
        for i in 0..ctx.frames {
            io.outputs[0][i] = io.input(0).get(i).copied().unwrap_or(0.0) * self.0;
        }
    }
    fn set_sample_rate(&mut self, _: f32) {}
    fn reset(&mut self) {}
}

/// 0-in/1-out kernel that emits its `value` parameter — exposes exactly
/// what the patch staged into the parameter array each block.
struct ParamEmitter;

static EMITTER_PARAMS: &[ParamDescriptor] =
    &[ParamDescriptor::new("value", -10.0, 10.0, 1.0, ParamRate::ARate)];

impl Kernel for ParamEmitter {
    fn inlets(&self) -> &'static [&'static str] {
        &[]
    }
    fn outlets(&self) -> &'static [&'static str] {
        &["out"]
    }
    fn params(&self) -> &'static [ParamDescriptor] {
        EMITTER_PARAMS
    }
    fn render(&mut self, ctx: &RenderContext, io: &mut BlockIo<'_>, params: &ParamBlocks<'_>) {
        for i in 0..ctx.frames {
            io.outputs[0][i] = sample_held(params.get(0), i);
        }
    }
    fn set_sample_rate(&mut self, _: f32) {}
    fn reset(&mut self) {}
}

/// Module source whose single module "fake" loads on command.
struct FakeSource {
    loaded: bool,
}

static FAKE_DESC: ModuleDescriptor = ModuleDescriptor {
    id: "fake",
    name: "Fake",
    summary: "test module",
    inlets: &["in"],
    outlets: &["out"],
    params: &[],
};

impl ModuleSource for FakeSource {
    fn descriptor(&self, id: &str) -> Option<&ModuleDescriptor> {
        (id == "fake").then_some(&FAKE_DESC)
    }
    fn is_loaded(&self, id: &str) -> bool {
        id == "fake" && self.loaded
    }
    fn instantiate(&self, id: &str, _: f32) -> Option<Box<dyn Kernel>> {
        (id == "fake" && self.loaded).then(|| Box::new(Gain(2.0)) as Box<dyn Kernel>)
    }
}

fn patch() -> Patch {
    Patch::new(SR, BLOCK)
}

#[test]
fn chain_renders_through_the_graph() {
    let mut p = patch();
    let src = p.add_source();
    let gain = p.add_kernel("gain", Box::new(Gain(3.0)));
    let sink = p.add_sink();
    let chained = p.connect(src, gain).and_then(|n| p.connect(n, sink));
    assert_eq!(chained, Some(sink), "connect chains through node targets");

    p.write_source(src, &[0.5; BLOCK]);
    p.render_block();
    let out = p.sink_frames(sink);
    assert_eq!(out.len(), BLOCK);
    assert!(out.iter().all(|v| (*v - 1.5).abs() < 1e-6));
}

#[test]
fn fan_in_sums_at_the_inlet() {
    let mut p = patch();
    let a = p.add_source();
    let b = p.add_source();
    let sink = p.add_sink();
    p.connect(a, sink).unwrap();
    p.connect(b, sink).unwrap();

    p.write_source(a, &[0.25; BLOCK]);
    p.write_source(b, &[0.5; BLOCK]);
    p.render_block();
    assert!((p.sink_frames(sink)[0] - 0.75).abs() < 1e-6);
}

#[test]
fn node_without_outlet_rejects_outgoing_connections() {
    let mut p = patch();
    let sink = p.add_sink();
    let gain = p.add_kernel("gain", Box::new(Gain(1.0)));

    assert_eq!(p.connect(sink, gain), None);
    assert_eq!(
        p.try_connect_ports(sink, 0, gain, 0),
        Err(PatchError::NoOutlet(sink, 0))
    );
    // Graph unchanged: rendering still works and the inlet stays silent.
    p.render_block();
    assert!(p.outlet(gain, 0).iter().all(|v| *v == 0.0));
}

#[test]
fn bad_ports_are_rejected_without_mutation() {
    let mut p = patch();
    let src = p.add_source();
    let gain = p.add_kernel("gain", Box::new(Gain(1.0)));

    assert_eq!(
        p.try_connect_ports(src, 3, gain, 0),
        Err(PatchError::NoOutlet(src, 3))
    );
    assert_eq!(
        p.try_connect_ports(src, 0, gain, 7),
        Err(PatchError::NoSuchInlet { node: gain, inlet: 7 })
    );
    assert!(matches!(
        p.try_connect_param(src, 0, gain, "drive"),
        Err(PatchError::NoSuchParam { .. })
    ));
}

#[test]
fn cycles_are_rejected() {
    let mut p = patch();
    let a = p.add_kernel("gain", Box::new(Gain(1.0)));
    let b = p.add_kernel("gain", Box::new(Gain(1.0)));
    p.connect(a, b).unwrap();
    assert_eq!(p.try_connect_ports(b, 0, a, 0), Err(PatchError::CycleDetected));
    assert_eq!(p.try_connect_ports(a, 0, a, 0), Err(PatchError::CycleDetected));
}

#[test]
fn signal_sums_additively_into_a_parameter() {
    let mut p = patch();
    let emitter = p.add_kernel("emit", Box::new(ParamEmitter));
    let src = p.add_source();
    // connect_param returns the source, keeping signal chaining open.
    assert_eq!(p.connect_param(src, 0, emitter, "value"), Some(src));

    p.set_param(emitter, "value", 1.0);
    p.write_source(src, &[0.25; BLOCK]);
    p.render_block();
    // Automated value and incoming signal sum.
    assert!((p.outlet(emitter, 0)[10] - 1.25).abs() < 1e-6);
}

#[test]
fn external_param_writes_clamp_to_range() {
    let mut p = patch();
    let emitter = p.add_kernel("emit", Box::new(ParamEmitter));
    p.set_param(emitter, "value", 99.0);
    assert_eq!(p.param(emitter, "value"), 10.0);
    p.set_param(emitter, "value", -99.0);
    assert_eq!(p.param(emitter, "value"), -10.0);
    assert!(!p.set_param(emitter, "value-typo", 1.0));
}

#[test]
fn disconnect_removes_one_or_all_edges() {
    let mut p = patch();
    let src = p.add_source();
    let g1 = p.add_kernel("gain", Box::new(Gain(1.0)));
    let g2 = p.add_kernel("gain", Box::new(Gain(1.0)));
    p.connect(src, g1).unwrap();
    p.connect(src, g2).unwrap();

    p.write_source(src, &[1.0; BLOCK]);
    p.render_block();
    assert_eq!(p.outlet(g1, 0)[0], 1.0);
    assert_eq!(p.outlet(g2, 0)[0], 1.0);

    p.disconnect(src, Some(g1));
    p.write_source(src, &[1.0; BLOCK]);
    p.render_block();
    assert_eq!(p.outlet(g1, 0)[0], 0.0, "removed edge no longer feeds g1");
    assert_eq!(p.outlet(g2, 0)[0], 1.0);

    p.disconnect(src, None);
    p.write_source(src, &[1.0; BLOCK]);
    p.render_block();
    assert_eq!(p.outlet(g2, 0)[0], 0.0, "all outgoing edges removed");
}

#[test]
fn tap_observes_the_outlet_read_only() {
    let mut p = patch();
    let src = p.add_source();
    let gain = p.add_kernel("gain", Box::new(Gain(2.0)));
    p.connect(src, gain).unwrap();

    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    let tap = p
        .tap(gain, 0, move |block| {
            assert_eq!(block.len(), BLOCK);
            if block.iter().all(|v| (*v - 0.8).abs() < 1e-6) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .expect("tap attaches");

    p.write_source(src, &[0.4; BLOCK]);
    p.render_block();
    p.render_block();
    assert_eq!(seen.load(Ordering::SeqCst), 2, "tap sees every rendered block");

    p.remove_tap(tap);
    p.render_block();
    assert_eq!(seen.load(Ordering::SeqCst), 2, "removed tap stops observing");

    // Tapping a missing outlet is rejected.
    assert!(p.tap(gain, 5, |_| {}).is_none());
}

#[test]
fn pending_node_renders_silence_until_module_resolves() {
    let mut source = FakeSource { loaded: false };
    let mut p = patch();
    let src = p.add_source();
    let node = p.spawn(&source, "fake");
    let sink = p.add_sink();
    p.connect(src, node).unwrap();
    p.connect(node, sink).unwrap();
    assert_eq!(p.lifecycle(node), Some(Lifecycle::PendingInit));

    let inits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&inits);
    p.on_init(node, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    p.write_source(src, &[1.0; BLOCK]);
    p.render_block();
    assert!(p.sink_frames(sink).iter().all(|v| *v == 0.0), "pending = silence");
    assert_eq!(inits.load(Ordering::SeqCst), 0);

    // Module resolves on the control plane; the patch finishes the node.
    source.loaded = true;
    p.finish_pending(&source);
    assert_eq!(p.lifecycle(node), Some(Lifecycle::Initialized));
    assert_eq!(inits.load(Ordering::SeqCst), 1, "init fires exactly once");

    p.finish_pending(&source);
    assert_eq!(inits.load(Ordering::SeqCst), 1, "no refiring");

    p.write_source(src, &[1.0; BLOCK]);
    p.render_block();
    assert!((p.sink_frames(sink)[0] - 2.0).abs() < 1e-6, "kernel now renders");

    // Late subscription runs immediately.
    let late = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&late);
    p.on_init(node, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert_eq!(late.load(Ordering::SeqCst), 1);
}

#[test]
fn unknown_module_yields_a_disabled_stand_in() {
    let source = FakeSource { loaded: true };
    let mut p = patch();
    let src = p.add_source();
    let node = p.spawn(&source, "does-not-exist");
    let sink = p.add_sink();

    // The stand-in still exposes ports, so graph wiring code keeps working.
    assert!(p.connect(src, node).is_some());
    assert!(p.connect(node, sink).is_some());
    assert_eq!(p.lifecycle(node), Some(Lifecycle::Initialized));

    p.write_source(src, &[1.0; BLOCK]);
    p.render_block();
    assert!(p.sink_frames(sink).iter().all(|v| *v == 0.0), "stand-in is silent");
}

#[test]
fn removed_node_stops_participating() {
    let mut p = patch();
    let src = p.add_source();
    let gain = p.add_kernel("gain", Box::new(Gain(1.0)));
    let sink = p.add_sink();
    p.connect(src, gain).unwrap();
    p.connect(gain, sink).unwrap();

    p.remove(gain);
    p.write_source(src, &[1.0; BLOCK]);
    p.render_block();
    assert!(p.sink_frames(sink).iter().all(|v| *v == 0.0));
    assert_eq!(p.lifecycle(gain), None);
    assert_eq!(p.connect(src, gain), None, "removed node rejects wiring");
}
