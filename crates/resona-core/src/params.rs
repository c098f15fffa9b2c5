//! Parameter declaration and storage.
//!
//! Every kernel declares its control parameters as a static table of
//! [`ParamDescriptor`]s: name, range, default, automation granularity, and
//! normalization scale. The host reads the table to build its control
//! surface; the patch runtime uses it to build a [`ParamSet`] per node.
//!
//! A `ParamSet` is an owned component embedded in each node rather than
//! behavior inherited from a base type: it holds the current clamped value
//! for every declared parameter and nothing else. The patch turns those
//! values into per-block arrays before each node renders.

/// Automation granularity of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamRate {
    /// Per-sample automation: the per-block array carries one value per frame.
    ARate,
    /// Per-block automation: the per-block array carries a single value.
    #[default]
    KRate,
}

/// Scaling curve mapping a plain value to normalized [0, 1] space.
///
/// Linear is the default. Logarithmic suits frequency parameters
/// (20 Hz–20 kHz); `Power` gives more resolution at one end of the range.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ParamScale {
    /// Equal resolution across the range.
    #[default]
    Linear,
    /// More resolution at low values. Requires `min > 0`.
    Logarithmic,
    /// Power curve with the given exponent; `< 1` favors the low end.
    Power(f32),
}

/// Declares a single control parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Parameter name, unique within its kernel.
    pub name: &'static str,
    /// Minimum allowed value.
    pub min: f32,
    /// Maximum allowed value.
    pub max: f32,
    /// Value a fresh node starts with.
    pub default: f32,
    /// Automation granularity.
    pub rate: ParamRate,
    /// Normalization curve for the optional normalized setter.
    pub scale: ParamScale,
}

impl ParamDescriptor {
    /// Declare a parameter with a linear scale.
    pub const fn new(
        name: &'static str,
        min: f32,
        max: f32,
        default: f32,
        rate: ParamRate,
    ) -> Self {
        Self {
            name,
            min,
            max,
            default,
            rate,
            scale: ParamScale::Linear,
        }
    }

    /// Override the normalization scale.
    pub const fn with_scale(mut self, scale: ParamScale) -> Self {
        self.scale = scale;
        self
    }

    /// Clamp a value into this parameter's range.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Map a plain value in [min, max] to normalized [0, 1].
    pub fn normalize(&self, value: f32) -> f32 {
        let v = self.clamp(value);
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        match self.scale {
            ParamScale::Linear => (v - self.min) / span,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    (v - self.min) / span
                } else {
                    libm::logf(v / self.min) / libm::logf(self.max / self.min)
                }
            }
            ParamScale::Power(exp) => libm::powf((v - self.min) / span, 1.0 / exp.max(1e-6)),
        }
    }

    /// Map a normalized [0, 1] value to the plain range through the scale.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let n = normalized.clamp(0.0, 1.0);
        let span = self.max - self.min;
        match self.scale {
            ParamScale::Linear => self.min + n * span,
            ParamScale::Logarithmic => {
                if self.min <= 0.0 {
                    self.min + n * span
                } else {
                    self.min * libm::powf(self.max / self.min, n)
                }
            }
            ParamScale::Power(exp) => self.min + libm::powf(n, exp.max(1e-6)) * span,
        }
    }
}

/// Named, clamped parameter storage for one node.
///
/// Values written from the control plane are clamped to the declared range
/// before they are stored — a misconfigured host cannot push a kernel out
/// of its stable region. Reads never fail: an unknown name reads as 0.
#[derive(Debug, Clone)]
pub struct ParamSet {
    descriptors: &'static [ParamDescriptor],
    values: Vec<f32>,
}

impl ParamSet {
    /// Build a set from a kernel's descriptor table, at default values.
    pub fn new(descriptors: &'static [ParamDescriptor]) -> Self {
        let values = descriptors.iter().map(|d| d.default).collect();
        Self {
            descriptors,
            values,
        }
    }

    /// The descriptor table this set was built from.
    pub fn descriptors(&self) -> &'static [ParamDescriptor] {
        self.descriptors
    }

    /// Number of declared parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the kernel declares no parameters.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of a parameter by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name == name)
    }

    /// Write a plain value, clamped to the declared range.
    ///
    /// Returns `false` for an unknown name, leaving the set unchanged.
    pub fn set(&mut self, name: &str, value: f32) -> bool {
        match self.index_of(name) {
            Some(i) => {
                self.values[i] = self.descriptors[i].clamp(value);
                true
            }
            None => false,
        }
    }

    /// Write a normalized [0, 1] value mapped through the declared scale.
    pub fn set_normalized(&mut self, name: &str, normalized: f32) -> bool {
        match self.index_of(name) {
            Some(i) => {
                let d = &self.descriptors[i];
                self.values[i] = d.clamp(d.denormalize(normalized));
                true
            }
            None => false,
        }
    }

    /// Current value by name; 0 for an unknown name.
    pub fn get(&self, name: &str) -> f32 {
        self.index_of(name).map_or(0.0, |i| self.values[i])
    }

    /// Current value by index.
    #[inline]
    pub fn value(&self, index: usize) -> f32 {
        self.values.get(index).copied().unwrap_or(0.0)
    }
}
