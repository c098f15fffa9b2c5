//! Dry/wet effect composition.
//!
//! Wraps a wet subgraph behind a crossfade so any processing chain
//! presents as a single insert with one `mix` control. The dry and wet
//! paths both render every block regardless of the mix value — mix only
//! blends, it never bypasses — so feedback and modulation state inside the
//! wet chain stays warm and control changes cannot destabilize it.

use resona_core::{NodeId, Patch};

use crate::arithmetic::{Arithmetic, ArithmeticOp};
use crate::crossfade::{Crossfade, FadeCurve};

/// A wired dry/wet insert in a patch.
///
/// Feed signal into [`input`](Self::input), take the blend from
/// [`output`](Self::output), and set `mix` in [0, 1] via
/// [`set_mix`](Self::set_mix).
#[derive(Debug, Clone, Copy)]
pub struct EffectInsert {
    input: NodeId,
    output: NodeId,
}

impl EffectInsert {
    /// Wrap the wet subgraph running from `wet_in` to `wet_out`.
    ///
    /// Creates a summing junction in front (the shared entry for both
    /// paths) and a constant-power crossfade behind (`a` = dry, `b` =
    /// wet). Returns `None` — with the graph unchanged beyond the two
    /// helper nodes — if any wire is rejected.
    pub fn wrap(patch: &mut Patch, wet_in: NodeId, wet_out: NodeId) -> Option<Self> {
        let input = patch.add_kernel("effect-in", Box::new(Arithmetic::new(ArithmeticOp::Add)));
        let blend = patch.add_kernel(
            "effect-mix",
            Box::new(Crossfade::new(FadeCurve::ConstantPower)),
        );

        // Dry path straight into the crossfade's A leg.
        patch.connect_ports(input, 0, blend, 0)?;
        // Wet path through the subgraph into the B leg.
        patch.connect_ports(input, 0, wet_in, 0)?;
        patch.connect_ports(wet_out, 0, blend, 1)?;

        Some(Self {
            input,
            output: blend,
        })
    }

    /// The insert's entry node.
    pub fn input(&self) -> NodeId {
        self.input
    }

    /// The insert's blended output node.
    pub fn output(&self) -> NodeId {
        self.output
    }

    /// Set the dry/wet blend: 0 is fully dry, 1 fully wet.
    pub fn set_mix(&self, patch: &mut Patch, mix: f32) {
        patch.set_param(self.output, "mix", mix.clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::svf::StateVariableFilter;

    fn build(mix: f32) -> (Patch, NodeId, EffectInsert) {
        let mut patch = Patch::new(48000.0, 128);
        let source = patch.add_source();
        let filter = patch.add_kernel("svf", Box::new(StateVariableFilter::new(48000.0)));
        let insert = EffectInsert::wrap(&mut patch, filter, filter).expect("wiring");
        patch.connect(source, insert.input()).expect("source wire");
        insert.set_mix(&mut patch, mix);
        (patch, source, insert)
    }

    #[test]
    fn fully_dry_passes_the_input() {
        let (mut patch, source, insert) = build(0.0);
        patch.write_source(source, &[0.5; 128]);
        patch.render_block();
        let dry = patch.outlet(insert.output(), 0)[64];
        assert!((dry - 0.5).abs() < 1e-5, "dry mix should pass input, got {dry}");
    }

    #[test]
    fn fully_wet_reflects_the_wet_chain() {
        let (mut patch, source, insert) = build(1.0);
        patch.write_source(source, &[0.5; 128]);
        patch.render_block();
        // First sample ever: the lowpass is still charging from zero, so
        // the wet output must sit well below the input step.
        let wet = patch.outlet(insert.output(), 0)[0];
        assert!(wet < 0.4, "wet mix should reflect the filter, got {wet}");
    }

    #[test]
    fn wet_path_runs_even_when_fully_dry() {
        let mut patch = Patch::new(48000.0, 128);
        let source = patch.add_source();
        let filter = patch.add_kernel("svf", Box::new(StateVariableFilter::new(48000.0)));
        let insert = EffectInsert::wrap(&mut patch, filter, filter).expect("wiring");
        patch.connect(source, insert.input()).expect("source wire");

        insert.set_mix(&mut patch, 0.0);
        for _ in 0..40 {
            patch.write_source(source, &[1.0; 128]);
            patch.render_block();
        }
        // The filter charged toward DC in the background even though the
        // mix never exposed it.
        let wet_tail = patch.outlet(filter, 0)[127];
        assert!(
            (wet_tail - 1.0).abs() < 0.05,
            "wet chain must keep running at mix = 0, got {wet_tail}"
        );
    }
}
