//! Interactive simulation demos for communication-systems teaching.
//!
//! Each demo page maps raw slider/dropdown values to a parameter set, runs a
//! numerical model only when those parameters change, and merges the fresh
//! data into the chart the user has been zooming and toggling.

#[path = "core/error.rs"]
pub mod error;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/explode.rs"]
pub mod explode;

#[path = "core/bundle.rs"]
pub mod bundle;

#[path = "core/chart.rs"]
pub mod chart;

#[path = "core/merge.rs"]
pub mod merge;

#[path = "core/cache.rs"]
pub mod cache;

#[path = "core/controls.rs"]
pub mod controls;

#[path = "core/session.rs"]
pub mod session;

pub mod config;
pub mod demos;
pub mod host;
pub mod models;

#[cfg(feature = "host")]
pub mod paths;

pub mod prelude {
    pub use crate::bundle::{DisplayMode, MarkerStyle, OutputBundle, Point, Series, SeriesRole};
    pub use crate::cache::{FnSimulator, SimulationCache, Simulator};
    pub use crate::chart::{AutoRange, Axis, AxisId, ChartState, Layout, Trace, Visibility};
    pub use crate::controls::{ControlView, ParameterController, SliderMark, SliderSpec};
    pub use crate::demos::DemoKind;
    pub use crate::error::{DemoError, DemoResult};
    pub use crate::explode::{explode, explode_strict, Key, Nested, Tree};
    pub use crate::merge::{AxisDefaults, ChartDefaults, ChartStateMerger};
    pub use crate::session::{Demo, DemoSession, Render};
}
