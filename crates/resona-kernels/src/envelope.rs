//! Gate-driven envelope generator.
//!
//! A five-state machine (Idle, Attack, Decay, Sustain, Release) driven by
//! a 0/1 gate signal, with a configurable stage set for the classic
//! envelope families. Each active stage is an exponential approach toward
//! a target that deliberately overshoots the stage's completion threshold
//! by `shape`, so the approach always crosses the threshold and the knee
//! of the curve is controllable:
//!
//! ```text
//! value += coeff * (target - value)
//! coeff  = 1 - exp(-ln((1+shape)/shape) / duration_samples)
//! ```
//!
//! Retriggering is legato: a rising gate edge enters Attack from wherever
//! the envelope currently sits, never snapping to zero. A falling edge
//! enters Release from the current value regardless of stage; in a stage
//! set without a release stage it returns straight to Idle. Idle forces
//! the output to exactly 0.

use libm::{expf, logf};
use resona_core::{
    BlockIo, Kernel, ParamBlocks, ParamDescriptor, ParamRate, RenderContext, sample_held,
};

/// Decay completes when the value is within this of the sustain level.
const DECAY_EPS: f32 = 1e-3;
/// Release completes (to Idle) when the value falls below this.
const IDLE_EPS: f32 = 1e-4;

/// Which stages this envelope runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageSet {
    /// Attack, then hold at full level until the gate falls; release to 0.
    AttackRelease,
    /// Attack, settle on the sustain level, release on gate fall.
    AttackSustainRelease,
    /// Attack, decay to sustain, hold; gate fall returns to Idle directly.
    AttackDecaySustain,
    /// The full four-stage envelope.
    #[default]
    Adsr,
}

impl StageSet {
    fn has_decay(self) -> bool {
        matches!(self, Self::AttackDecaySustain | Self::Adsr)
    }

    fn has_release(self) -> bool {
        !matches!(self, Self::AttackDecaySustain)
    }
}

/// Envelope state machine stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Output forced to 0, waiting for a gate.
    #[default]
    Idle,
    /// Rising toward full level.
    Attack,
    /// Falling toward the sustain level.
    Decay,
    /// Holding near the sustain level while the gate stays high.
    Sustain,
    /// Falling toward 0 after the gate dropped.
    Release,
}

/// Envelope generator kernel: gate in, envelope out.
#[derive(Debug, Clone)]
pub struct EnvelopeGenerator {
    stages: StageSet,
    stage: Stage,
    value: f32,
    gate_high: bool,
    sample_rate: f32,
}

impl EnvelopeGenerator {
    /// Inlet names.
    pub const INLETS: &'static [&'static str] = &["gate"];
    /// Outlet names.
    pub const OUTLETS: &'static [&'static str] = &["out"];
    /// Parameter table.
    pub const PARAMS: &'static [ParamDescriptor] = &[
        ParamDescriptor::new("attack", 0.1, 20000.0, 10.0, ParamRate::KRate),
        ParamDescriptor::new("decay", 0.1, 20000.0, 120.0, ParamRate::KRate),
        ParamDescriptor::new("sustain", 0.0, 1.0, 0.7, ParamRate::KRate),
        ParamDescriptor::new("release", 0.1, 20000.0, 250.0, ParamRate::KRate),
        ParamDescriptor::new("shape", 0.001, 10.0, 0.5, ParamRate::KRate),
    ];

    /// Create an envelope with the given stage set.
    pub fn new(sample_rate: f32, stages: StageSet) -> Self {
        Self {
            stages,
            stage: Stage::Idle,
            value: 0.0,
            gate_high: false,
            sample_rate,
        }
    }

    /// The configured stage set.
    pub fn stages(&self) -> StageSet {
        self.stages
    }

    /// Current state-machine stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Stage coefficient from a duration in ms and the shape parameter.
    #[inline]
    fn coeff(&self, duration_ms: f32, shape: f32) -> f32 {
        let samples = (duration_ms.max(0.01) * self.sample_rate / 1000.0).max(1.0);
        let rate = logf((1.0 + shape) / shape);
        1.0 - expf(-rate / samples)
    }

    /// The level a gate-held envelope settles on.
    fn sustain_target(&self, sustain: f32) -> f32 {
        match self.stages {
            StageSet::AttackRelease => 1.0,
            _ => sustain,
        }
    }
}

impl Kernel for EnvelopeGenerator {
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
        let attack_ms = sample_held(params.get(0), 0);
        let decay_ms = sample_held(params.get(1), 0);
        let sustain = sample_held(params.get(2), 0).clamp(0.0, 1.0);
        let release_ms = sample_held(params.get(3), 0);
        let shape = sample_held(params.get(4), 0).max(0.001);

        let attack_coeff = self.coeff(attack_ms, shape);
        let decay_coeff = self.coeff(decay_ms, shape);
        let release_coeff = self.coeff(release_ms, shape);
        let sustain_level = self.sustain_target(sustain);

        for i in 0..ctx.frames {
            let gate = io.input(0).get(i).copied().unwrap_or(0.0) > 0.5;
            if gate && !self.gate_high {
                // Legato retrigger: attack continues from the current value.
                self.stage = Stage::Attack;
            } else if !gate && self.gate_high && self.stage != Stage::Idle {
                if self.stages.has_release() {
                    self.stage = Stage::Release;
                } else {
                    self.stage = Stage::Idle;
                    self.value = 0.0;
                }
            }
            self.gate_high = gate;

            match self.stage {
                Stage::Idle => {
                    self.value = 0.0;
                }
                Stage::Attack => {
                    let target = 1.0 + shape;
                    self.value += attack_coeff * (target - self.value);
                    if self.value >= 1.0 {
                        self.stage = if self.stages.has_decay() {
                            Stage::Decay
                        } else {
                            Stage::Sustain
                        };
                    }
                }
                Stage::Decay => {
                    let target = sustain_level - shape;
                    self.value += decay_coeff * (target - self.value);
                    if self.value <= sustain_level + DECAY_EPS {
                        self.stage = Stage::Sustain;
                    }
                }
                Stage::Sustain => {
                    // Settle on the sustain level; for stage sets where the
                    // attack lands above it, glide down at the decay rate.
                    self.value += decay_coeff * (sustain_level - self.value);
                }
                Stage::Release => {
                    let target = -shape;
                    self.value += release_coeff * (target - self.value);
                    if self.value < IDLE_EPS {
                        self.stage = Stage::Idle;
                        self.value = 0.0;
                    }
                }
            }

            io.outputs[0][i] = self.value;
        }
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn reset(&mut self) {
        self.stage = Stage::Idle;
        self.value = 0.0;
        self.gate_high = false;
    }
}
