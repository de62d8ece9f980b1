//! Rendering-facing chart description.
//!
//! A [`ChartState`] is owned by the rendering boundary between passes. The
//! serialized shape follows the plotly figure vocabulary (`visible`,
//! `autorange`, `scaleanchor`, `hovermode`) so that a renderer can hand its
//! current figure straight back as the prior chart. Unknown layout and axis
//! fields are carried in `extra` and survive a merge untouched.

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bundle::{DisplayMode, MarkerStyle, Point};

/// Trace visibility as toggled from the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    /// Hidden from the plot area, still listed in the legend.
    LegendOnly,
    Hidden,
}

impl Serialize for Visibility {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Visibility::Visible => s.serialize_bool(true),
            Visibility::Hidden => s.serialize_bool(false),
            Visibility::LegendOnly => s.serialize_str("legendonly"),
        }
    }
}

impl<'de> Deserialize<'de> for Visibility {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Word(String),
        }

        match Raw::deserialize(d)? {
            Raw::Flag(true) => Ok(Visibility::Visible),
            Raw::Flag(false) => Ok(Visibility::Hidden),
            Raw::Word(w) if w == "legendonly" => Ok(Visibility::LegendOnly),
            Raw::Word(w) => Err(de::Error::unknown_variant(&w, &["legendonly"])),
        }
    }
}

/// Axis auto-range mode: `false`, `true`, or one of the renderer's words
/// (`"reversed"`, `"min reversed"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AutoRange {
    #[default]
    Off,
    On,
    Reversed,
    Other(String),
}

impl AutoRange {
    pub fn is_auto(&self) -> bool {
        *self != AutoRange::Off
    }

    /// Auto-ranged with the axis direction flipped.
    pub fn is_reversed(&self) -> bool {
        match self {
            AutoRange::Reversed => true,
            AutoRange::Other(w) => w.contains("reversed"),
            AutoRange::Off | AutoRange::On => false,
        }
    }
}

impl Serialize for AutoRange {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            AutoRange::Off => s.serialize_bool(false),
            AutoRange::On => s.serialize_bool(true),
            AutoRange::Reversed => s.serialize_str("reversed"),
            AutoRange::Other(w) => s.serialize_str(w),
        }
    }
}

impl<'de> Deserialize<'de> for AutoRange {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Word(String),
        }

        Ok(match Raw::deserialize(d)? {
            Raw::Flag(true) => AutoRange::On,
            Raw::Flag(false) => AutoRange::Off,
            Raw::Word(w) if w == "reversed" => AutoRange::Reversed,
            Raw::Word(w) => AutoRange::Other(w),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisId {
    X,
    Y,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Axis {
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<(f64, f64)>,
    #[serde(default)]
    pub autorange: AutoRange,
    #[serde(default, rename = "scaleanchor", skip_serializing_if = "Option::is_none")]
    pub scale_anchor: Option<AxisId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub xaxis: Axis,
    #[serde(default)]
    pub yaxis: Axis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Layout {
    pub fn axis(&self, id: AxisId) -> &Axis {
        match id {
            AxisId::X => &self.xaxis,
            AxisId::Y => &self.yaxis,
        }
    }

    pub fn axes_mut(&mut self) -> [(AxisId, &mut Axis); 2] {
        [(AxisId::X, &mut self.xaxis), (AxisId::Y, &mut self.yaxis)]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub mode: DisplayMode,
    pub points: Vec<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Vec<String>>,
    #[serde(default)]
    pub visible: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChartState {
    pub traces: Vec<Trace>,
    pub layout: Layout,
}
