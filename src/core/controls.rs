//! Raw UI controls and their translation into simulation parameters.
//!
//! A [`ParameterController`] holds no state: every call is a pure function of
//! the current raw control values. Out-of-range values are clamped to the
//! slider's hard limits, non-finite values fall back to the slider default.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderMark {
    pub value: f64,
    pub label: String,
}

impl SliderMark {
    pub fn new(value: f64, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }
}

/// Static description of one slider: limits, step and default.
#[derive(Debug, Clone, PartialEq)]
pub struct SliderSpec {
    pub key: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl SliderSpec {
    pub const fn new(key: &'static str, min: f64, max: f64, step: f64, default: f64) -> Self {
        Self {
            key,
            min,
            max,
            step,
            default,
        }
    }

    pub fn clamp(&self, v: f64) -> f64 {
        if v.is_finite() {
            v.clamp(self.min, self.max)
        } else {
            self.default
        }
    }

    /// Clamp then round to the nearest integer (for exponent/count sliders).
    pub fn clamp_int(&self, v: f64) -> u32 {
        self.clamp(v).round() as u32
    }
}

/// UI-only state derived from the raw controls.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlView {
    /// Human-readable label per control key.
    pub labels: BTreeMap<String, String>,
    /// Slider marks that depend on other controls.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub marks: BTreeMap<String, Vec<SliderMark>>,
    /// Controls the UI should hide.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hidden: Vec<String>,
}

impl ControlView {
    pub fn label(mut self, key: &str, text: impl Into<String>) -> Self {
        self.labels.insert(key.to_string(), text.into());
        self
    }

    pub fn marks(mut self, key: &str, marks: Vec<SliderMark>) -> Self {
        self.marks.insert(key.to_string(), marks);
        self
    }

    pub fn hide(mut self, key: &str) -> Self {
        self.hidden.push(key.to_string());
        self
    }

    pub fn is_hidden(&self, key: &str) -> bool {
        self.hidden.iter().any(|k| k == key)
    }
}

/// Raw controls -> parameter set, plus UI-only derived state.
///
/// Controls round-trip through JSON so that partial form submissions can be
/// overlaid onto the current values.
pub trait ParameterController {
    type Controls: Clone + fmt::Debug + Serialize + DeserializeOwned;
    type Params;

    fn normalize(controls: &Self::Controls) -> Self::Params;

    fn control_view(controls: &Self::Controls) -> ControlView;
}

/// `2^exp` for order sliders.
pub fn order_from_exponent(exp: u32) -> usize {
    1usize << exp
}

/// Marks for a phase slider: `-π`, `0`, `π`, plus `π/M` when `M <= 8`.
pub fn phase_marks(order: usize) -> Vec<SliderMark> {
    use std::f64::consts::PI;

    let mut marks = vec![
        SliderMark::new(-PI, "-π"),
        SliderMark::new(0.0, "0"),
        SliderMark::new(PI, "π"),
    ];
    if order <= 8 {
        marks.push(SliderMark::new(PI / order as f64, format!("π/{order}")));
    }
    marks.sort_by(|a, b| a.value.total_cmp(&b.value));
    marks
}
