//! Carry a user's chart interactions across data refreshes.
//!
//! Re-rendering from scratch on every slider tick would reset the zoom and
//! every legend toggle. [`ChartStateMerger::merge`] rebuilds the traces from
//! the new bundle but keeps the prior chart's layout and per-trace visibility.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bundle::{OutputBundle, Series, SeriesRole};
use crate::chart::{AutoRange, Axis, AxisId, ChartState, Layout, Trace, Visibility};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisDefaults {
    pub title: String,
    pub range: (f64, f64),
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_anchor: Option<AxisId>,
}

impl AxisDefaults {
    pub fn new(title: impl Into<String>, range: (f64, f64)) -> Self {
        Self {
            title: title.into(),
            range,
            scale_anchor: None,
        }
    }

    /// Symmetric range `(-half_width, half_width)`.
    pub fn symmetric(title: impl Into<String>, half_width: f64) -> Self {
        Self::new(title, (-half_width, half_width))
    }

    pub fn anchored_to(mut self, other: AxisId) -> Self {
        self.scale_anchor = Some(other);
        self
    }

    fn to_axis(&self) -> Axis {
        Axis {
            title: self.title.clone(),
            range: Some(self.range),
            autorange: AutoRange::Off,
            scale_anchor: self.scale_anchor,
            extra: Default::default(),
        }
    }
}

/// Per-demo layout used for first renders and auto-range resets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDefaults {
    pub x: AxisDefaults,
    pub y: AxisDefaults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hovermode: Option<String>,
}

impl ChartDefaults {
    pub fn new(x: AxisDefaults, y: AxisDefaults) -> Self {
        Self {
            x,
            y,
            hovermode: None,
        }
    }

    pub fn with_hovermode(mut self, mode: impl Into<String>) -> Self {
        self.hovermode = Some(mode.into());
        self
    }

    pub fn axis(&self, id: AxisId) -> &AxisDefaults {
        match id {
            AxisId::X => &self.x,
            AxisId::Y => &self.y,
        }
    }
}

pub fn default_visibility(role: SeriesRole) -> Visibility {
    match role {
        SeriesRole::Primary | SeriesRole::Annotation => Visibility::Visible,
        SeriesRole::Auxiliary => Visibility::LegendOnly,
    }
}

fn trace_from_series(series: &Series) -> Trace {
    Trace {
        name: series.name.clone(),
        mode: series.mode,
        points: series.points.clone(),
        text: series.labels.clone(),
        visible: default_visibility(series.role),
        marker: series.marker.clone(),
    }
}

#[derive(Debug, Clone)]
pub struct ChartStateMerger {
    defaults: ChartDefaults,
}

impl ChartStateMerger {
    pub fn new(defaults: ChartDefaults) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &ChartDefaults {
        &self.defaults
    }

    /// Chart built from the bundle alone, with default layout and visibility.
    pub fn fresh(&self, bundle: &OutputBundle) -> ChartState {
        ChartState {
            traces: bundle.series.iter().map(trace_from_series).collect(),
            layout: Layout {
                title: bundle.title.clone(),
                xaxis: self.defaults.x.to_axis(),
                yaxis: self.defaults.y.to_axis(),
                hovermode: self.defaults.hovermode.clone(),
                extra: Default::default(),
            },
        }
    }

    /// New data, prior viewport and legend state.
    ///
    /// - traces always come from `bundle`,
    /// - the layout is inherited wholesale from `prior`, except the title,
    /// - inherited axes in auto-range mode, or without a range, are pinned to
    ///   the default range (flipped for reversed auto-range),
    /// - visibility is copied by position over the overlapping traces.
    pub fn merge(&self, bundle: &OutputBundle, prior: Option<&ChartState>) -> ChartState {
        let mut chart = self.fresh(bundle);
        let Some(prior) = prior else {
            return chart;
        };

        chart.layout = prior.layout.clone();
        chart.layout.title = bundle.title.clone();

        for (id, axis) in chart.layout.axes_mut() {
            // A range-less axis is auto-fitted by the renderer too.
            if axis.autorange.is_auto() || axis.range.is_none() {
                let (lo, hi) = self.defaults.axis(id).range;
                let range = if axis.autorange.is_reversed() { (hi, lo) } else { (lo, hi) };
                debug!(?id, ?range, "pinning auto-ranged axis to its default range");
                axis.autorange = AutoRange::Off;
                axis.range = Some(range);
            }
        }

        if prior.traces.len() != chart.traces.len() {
            debug!(
                prior = prior.traces.len(),
                fresh = chart.traces.len(),
                "trace count changed; carrying visibility over the overlap only"
            );
        }
        for (trace, old) in chart.traces.iter_mut().zip(&prior.traces) {
            trace.visible = old.visible;
        }

        chart
    }
}
