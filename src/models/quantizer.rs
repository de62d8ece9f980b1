use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DemoError, DemoResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuantizerChoice {
    /// Levels cover `[0, peak)`.
    Unsigned,
    /// Signed, zero is a decision threshold.
    #[default]
    MidRiser,
    /// Signed, zero is an output level.
    MidTread,
}

impl QuantizerChoice {
    pub fn label(self) -> &'static str {
        match self {
            QuantizerChoice::Unsigned => "unsigned",
            QuantizerChoice::MidRiser => "mid-riser",
            QuantizerChoice::MidTread => "mid-tread",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            QuantizerChoice::Unsigned => "Unsigned",
            QuantizerChoice::MidRiser => "Signed (mid-riser)",
            QuantizerChoice::MidTread => "Signed (mid-tread)",
        }
    }

    pub fn all() -> &'static [QuantizerChoice] {
        &[
            QuantizerChoice::Unsigned,
            QuantizerChoice::MidRiser,
            QuantizerChoice::MidTread,
        ]
    }
}

/// Uniform scalar quantizer with equally spaced output levels.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformQuantizer {
    num_levels: usize,
    input_peak: f64,
    choice: QuantizerChoice,
}

impl UniformQuantizer {
    pub fn new(num_levels: usize, input_peak: f64, choice: QuantizerChoice) -> DemoResult<Self> {
        if num_levels < 2 {
            return Err(DemoError::invalid("num_levels", format!("need at least 2 levels, got {num_levels}")));
        }
        if !(input_peak.is_finite() && input_peak > 0.0) {
            return Err(DemoError::invalid("input_peak", format!("must be positive, got {input_peak}")));
        }
        Ok(Self {
            num_levels,
            input_peak,
            choice,
        })
    }

    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    pub fn input_peak(&self) -> f64 {
        self.input_peak
    }

    pub fn choice(&self) -> QuantizerChoice {
        self.choice
    }

    /// Spacing between adjacent output levels.
    pub fn step(&self) -> f64 {
        match self.choice {
            QuantizerChoice::Unsigned => self.input_peak / self.num_levels as f64,
            QuantizerChoice::MidRiser | QuantizerChoice::MidTread => {
                2.0 * self.input_peak / self.num_levels as f64
            }
        }
    }

    fn lowest_level(&self) -> f64 {
        let delta = self.step();
        match self.choice {
            QuantizerChoice::Unsigned => 0.0,
            QuantizerChoice::MidRiser => -self.input_peak + delta / 2.0,
            QuantizerChoice::MidTread => -self.input_peak + delta,
        }
    }

    pub fn levels(&self) -> Vec<f64> {
        let (low, delta) = (self.lowest_level(), self.step());
        (0..self.num_levels).map(|k| low + delta * k as f64).collect()
    }

    /// Nearest output level; inputs beyond the range saturate.
    pub fn quantize(&self, x: f64) -> f64 {
        let (low, delta) = (self.lowest_level(), self.step());
        let top = (self.num_levels - 1) as f64;
        let k = ((x - low) / delta).round().clamp(0.0, top);
        low + delta * k
    }
}

impl fmt::Display for UniformQuantizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Uniform quantizer ({} levels, input peak {:.2}, {})",
            self.num_levels,
            self.input_peak,
            self.choice.label()
        )
    }
}
