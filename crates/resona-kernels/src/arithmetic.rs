//! Per-sample signal arithmetic.
//!
//! One operator, fixed at construction, applied sample-by-sample to two
//! input accumulation points. Unary operators read only input A. Division
//! guards near-zero divisors with a zero result — render-plane code never
//! raises.

use libm::{cosf, sinf};
use resona_core::{BlockIo, Kernel, ParamBlocks, RenderContext};

const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;

/// Operator applied by an [`Arithmetic`] kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mult,
    /// `a / b`, or 0 when `|b| < 1e-5`
    Div,
    /// `min(a, b)`
    Min,
    /// `max(a, b)`
    Max,
    /// `-a`
    Negate,
    /// `sin(a)`, radians
    Sin,
    /// `cos(a)`, radians
    Cos,
    /// `sin(a)`, degrees
    SinDeg,
    /// `cos(a)`, degrees
    CosDeg,
}

impl ArithmeticOp {
    /// Parse an operator name as used by module hosts.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "add" => Self::Add,
            "sub" => Self::Sub,
            "mult" => Self::Mult,
            "div" => Self::Div,
            "min" => Self::Min,
            "max" => Self::Max,
            "negate" => Self::Negate,
            "sin" => Self::Sin,
            "cos" => Self::Cos,
            "sin-deg" => Self::SinDeg,
            "cos-deg" => Self::CosDeg,
            _ => return None,
        })
    }

    #[inline]
    fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            Self::Add => a + b,
            Self::Sub => a - b,
            Self::Mult => a * b,
            Self::Div => {
                if b.abs() < 1e-5 {
                    0.0
                } else {
                    a / b
                }
            }
            Self::Min => a.min(b),
            Self::Max => a.max(b),
            Self::Negate => -a,
            Self::Sin => sinf(a),
            Self::Cos => cosf(a),
            Self::SinDeg => sinf(a * DEG_TO_RAD),
            Self::CosDeg => cosf(a * DEG_TO_RAD),
        }
    }
}

/// Two-input, one-output arithmetic kernel.
///
/// With operator `Add` and input B left unconnected this doubles as a
/// passthrough/summing junction, which is how the dry path of an effect
/// composition is built.
#[derive(Debug, Clone)]
pub struct Arithmetic {
    op: ArithmeticOp,
}

impl Arithmetic {
    /// Inlet names.
    pub const INLETS: &'static [&'static str] = &["a", "b"];
    /// Outlet names.
    pub const OUTLETS: &'static [&'static str] = &["out"];

    /// Create a kernel applying `op` every sample.
    pub fn new(op: ArithmeticOp) -> Self {
        Self { op }
    }

    /// The configured operator.
    pub fn op(&self) -> ArithmeticOp {
        self.op
    }
}

impl Kernel for Arithmetic {
    fn inlets(&self) -> &'static [&'static str] {
        Self::INLETS
    }

    fn outlets(&self) -> &'static [&'static str] {
        Self::OUTLETS
    }

    fn render(&mut self, ctx: &RenderContext, io: &mut BlockIo<'_>, _params: &ParamBlocks<'_>) {
        let op = self.op;
        for i in 0..ctx.frames {
            let a = io.input(0).get(i).copied().unwrap_or(0.0);
            let b = io.input(1).get(i).copied().unwrap_or(0.0);
            io.outputs[0][i] = op.apply(a, b);
        }
    }

    fn set_sample_rate(&mut self, _sample_rate: f32) {}

    fn reset(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(op: ArithmeticOp, a: f32, b: f32) -> f32 {
        let mut kernel = Arithmetic::new(op);
        let inputs = vec![vec![a; 8], vec![b; 8]];
        let mut outputs = vec![vec![0.0; 8]];
        let ctx = RenderContext {
            sample_rate: 48000.0,
            frames: 8,
        };
        let mut io = BlockIo {
            inputs: &inputs,
            outputs: &mut outputs,
        };
        kernel.render(&ctx, &mut io, &ParamBlocks::new(&[]));
        outputs[0][7]
    }

    #[test]
    fn binary_ops() {
        assert_eq!(run(ArithmeticOp::Add, 3.0, 4.0), 7.0);
        assert_eq!(run(ArithmeticOp::Sub, 3.0, 4.0), -1.0);
        assert_eq!(run(ArithmeticOp::Mult, 3.0, 4.0), 12.0);
        assert_eq!(run(ArithmeticOp::Min, 3.0, 4.0), 3.0);
        assert_eq!(run(ArithmeticOp::Max, 3.0, 4.0), 4.0);
    }

    #[test]
    fn div_guards_near_zero() {
        assert_eq!(run(ArithmeticOp::Div, 1.0, 0.0), 0.0);
        assert_eq!(run(ArithmeticOp::Div, 1.0, 9e-6), 0.0);
        assert_eq!(run(ArithmeticOp::Div, 8.0, 2.0), 4.0);
    }

    #[test]
    fn unary_ops_use_input_a() {
        assert_eq!(run(ArithmeticOp::Negate, 3.0, 99.0), -3.0);
        assert!((run(ArithmeticOp::Sin, 0.0, 99.0)).abs() < 1e-7);
        assert!((run(ArithmeticOp::Cos, 0.0, 99.0) - 1.0).abs() < 1e-7);
    }

    #[test]
    fn degree_variants() {
        assert!((run(ArithmeticOp::SinDeg, 90.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((run(ArithmeticOp::CosDeg, 180.0, 0.0) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn names_round_trip() {
        for name in [
            "add", "sub", "mult", "div", "min", "max", "negate", "sin", "cos", "sin-deg",
            "cos-deg",
        ] {
            assert!(ArithmeticOp::from_name(name).is_some(), "{name}");
        }
        assert!(ArithmeticOp::from_name("pow").is_none());
    }
}
