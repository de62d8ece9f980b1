//! One demo page's state across interactions.
//!
//! Each interaction runs a single synchronous pass:
//! normalize -> cache update -> merge with the prior chart -> render.
//! A session owns its cache and its last chart; sessions share nothing, so a
//! multi-threaded host only needs one lock per session.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::{SimulationCache, Simulator};
use crate::chart::ChartState;
use crate::controls::{ControlView, ParameterController};
use crate::error::{DemoError, DemoResult};
use crate::explode::{explode, explode_strict, tree_into_json, Key};
use crate::merge::{ChartDefaults, ChartStateMerger};

/// A demo page: a simulator plus the controller that feeds it.
pub trait Demo: Simulator {
    type Controller: ParameterController<Params = Self::Params>;

    /// Short name used in logs.
    const NAME: &'static str;

    fn chart_defaults(params: &Self::Params) -> ChartDefaults;
}

pub type ControlsOf<D> = <<D as Demo>::Controller as ParameterController>::Controls;

/// What the UI needs after a pass.
#[derive(Debug, Clone, Serialize)]
pub struct Render<'a> {
    pub chart: &'a ChartState,
    pub controls: ControlView,
}

pub struct DemoSession<D: Demo> {
    cache: SimulationCache<D>,
    controls: ControlsOf<D>,
    chart: Option<ChartState>,
    strict_keys: bool,
}

impl<D: Demo> DemoSession<D> {
    pub fn new(demo: D, controls: ControlsOf<D>) -> DemoResult<Self> {
        let params = D::Controller::normalize(&controls);
        let cache = SimulationCache::new(demo, params)?;
        Ok(Self {
            cache,
            controls,
            chart: None,
            strict_keys: false,
        })
    }

    /// Reject ambiguous form keys instead of reading them as plain names.
    pub fn with_strict_keys(mut self, strict: bool) -> Self {
        self.strict_keys = strict;
        self
    }

    pub fn controls(&self) -> &ControlsOf<D> {
        &self.controls
    }

    pub fn params(&self) -> &D::Params {
        self.cache.params()
    }

    pub fn chart(&self) -> Option<&ChartState> {
        self.chart.as_ref()
    }

    pub fn simulation_count(&self) -> u64 {
        self.cache.simulation_count()
    }

    pub fn cache(&self) -> &SimulationCache<D> {
        &self.cache
    }

    /// Run one pass with a full set of raw controls.
    ///
    /// If the simulation fails, the error is returned and the session keeps
    /// its previous controls, output and chart.
    pub fn handle(&mut self, controls: ControlsOf<D>) -> DemoResult<Render<'_>> {
        let params = D::Controller::normalize(&controls);
        let merger = ChartStateMerger::new(D::chart_defaults(&params));

        let bundle = match self.cache.update(params) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(demo = D::NAME, error = %e, "keeping last valid chart");
                return Err(e);
            }
        };
        let chart = merger.merge(bundle, self.chart.as_ref());

        self.controls = controls;
        self.chart = Some(chart);
        Ok(self.render())
    }

    /// Overlay a JSON object onto the current controls, then run a pass.
    ///
    /// Objects merge recursively; an object with numeric keys patches array
    /// elements in place. A top-level field whose result does not deserialize
    /// is skipped with a warning.
    pub fn handle_patch(&mut self, patch: Value) -> DemoResult<Render<'_>> {
        let controls = self.patched_controls(patch)?;
        self.handle(controls)
    }

    /// Explode flat form fields, coerce their string values, then patch.
    pub fn handle_form<K, I>(&mut self, fields: I) -> DemoResult<Render<'_>>
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let tree = if self.strict_keys {
            explode_strict(fields)?
        } else {
            explode(fields)
        };
        let patch = coerce_form_values(tree_into_json(tree));
        self.handle_patch(patch)
    }

    /// The rendering boundary reports the chart as the user left it.
    pub fn observe_chart(&mut self, chart: ChartState) {
        debug!(demo = D::NAME, traces = chart.traces.len(), "observed user chart state");
        self.chart = Some(chart);
    }

    /// Current chart (built fresh from the cached output if none exists yet).
    pub fn render(&mut self) -> Render<'_> {
        let cache = &self.cache;
        let chart = self.chart.get_or_insert_with(|| {
            ChartStateMerger::new(D::chart_defaults(cache.params())).fresh(cache.read())
        });
        Render {
            chart,
            controls: D::Controller::control_view(&self.controls),
        }
    }

    fn patched_controls(&self, patch: Value) -> DemoResult<ControlsOf<D>> {
        let Value::Object(fields) = patch else {
            return Err(DemoError::Serialization(
                "control patch must be a JSON object".into(),
            ));
        };

        let mut current = serde_json::to_value(&self.controls).map_err(DemoError::serialization)?;
        for (key, value) in fields {
            let mut candidate = current.clone();
            let mut single = Map::with_capacity(1);
            single.insert(key.clone(), value);
            overlay(&mut candidate, Value::Object(single));

            match serde_json::from_value::<ControlsOf<D>>(candidate.clone()) {
                Ok(_) => current = candidate,
                Err(e) => warn!(demo = D::NAME, field = %key, error = %e, "skipping control field"),
            }
        }
        serde_json::from_value(current).map_err(DemoError::serialization)
    }
}

fn overlay(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(items), Value::Object(patch)) => {
            for (key, value) in patch {
                match key.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
                    Some(slot) => overlay(slot, value),
                    None => debug!(index = %key, len = items.len(), "ignoring element patch outside the array"),
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Form values arrive as strings; turn the obvious ones into JSON scalars.
fn coerce_form_values(value: Value) -> Value {
    match value {
        Value::String(s) => coerce_scalar(s),
        Value::Array(items) => Value::Array(items.into_iter().map(coerce_form_values).collect()),
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, coerce_form_values(v)))
                .collect(),
        ),
        other => other,
    }
}

fn coerce_scalar(s: String) -> Value {
    let t = s.trim();
    match t.to_ascii_lowercase().as_str() {
        "true" | "on" => return Value::Bool(true),
        "false" | "off" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = t.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(f) = t.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{DisplayMode, OutputBundle, Point, Series, SeriesRole};
    use crate::chart::Visibility;
    use crate::merge::AxisDefaults;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct LineControls {
        slope_exp: f64,
        offsets: [f64; 2],
        enabled: bool,
    }

    impl Default for LineControls {
        fn default() -> Self {
            Self {
                slope_exp: 1.0,
                offsets: [0.0, 0.0],
                enabled: true,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    struct LineParams {
        slope: f64,
        offsets: (f64, f64),
    }

    struct LineController;

    impl ParameterController for LineController {
        type Controls = LineControls;
        type Params = LineParams;

        fn normalize(c: &LineControls) -> LineParams {
            LineParams {
                slope: 2f64.powf(c.slope_exp),
                offsets: (c.offsets[0], c.offsets[1]),
            }
        }

        fn control_view(c: &LineControls) -> ControlView {
            let view = ControlView::default().label("slope_exp", format!("Slope: {}", 2f64.powf(c.slope_exp)));
            if c.enabled {
                view
            } else {
                view.hide("offsets")
            }
        }
    }

    #[derive(Default)]
    struct LineDemo {
        calls: u32,
    }

    impl Simulator for LineDemo {
        type Params = LineParams;

        fn simulate(&mut self, p: &LineParams) -> DemoResult<OutputBundle> {
            self.calls += 1;
            if p.slope > 100.0 {
                return Err(DemoError::invalid("slope", "too steep"));
            }
            let pts = |off: f64| vec![Point::new(0.0, off), Point::new(1.0, p.slope + off)];
            Ok(OutputBundle::new(
                format!("slope {}", p.slope),
                vec![
                    Series::new("noise", SeriesRole::Auxiliary, DisplayMode::Markers, pts(p.offsets.1)),
                    Series::new("line", SeriesRole::Primary, DisplayMode::Lines, pts(p.offsets.0)),
                ],
            ))
        }
    }

    impl Demo for LineDemo {
        type Controller = LineController;
        const NAME: &'static str = "line";

        fn chart_defaults(_: &LineParams) -> ChartDefaults {
            ChartDefaults::new(AxisDefaults::symmetric("x", 2.0), AxisDefaults::symmetric("y", 3.0))
        }
    }

    fn session() -> DemoSession<LineDemo> {
        DemoSession::new(LineDemo::default(), LineControls::default()).unwrap()
    }

    #[test]
    fn first_render_is_fresh() {
        let mut s = session();
        let r = s.render();
        assert_eq!(r.chart.layout.title, "slope 2");
        assert_eq!(r.chart.layout.yaxis.range, Some((-3.0, 3.0)));
        assert_eq!(r.chart.traces[0].visible, Visibility::LegendOnly);
        assert_eq!(r.controls.labels["slope_exp"], "Slope: 2");
        assert_eq!(s.cache().simulator().calls, 1);
    }

    #[test]
    fn unchanged_controls_reuse_output_but_still_merge() {
        let mut s = session();
        s.render();
        let mut user = s.chart().unwrap().clone();
        user.layout.xaxis.range = Some((0.0, 0.5));
        s.observe_chart(user);

        let r = s.handle(LineControls::default()).unwrap();
        assert_eq!(r.chart.layout.xaxis.range, Some((0.0, 0.5)));
        assert_eq!(s.simulation_count(), 1);
    }

    #[test]
    fn changed_controls_keep_viewport_and_toggles() {
        let mut s = session();
        s.render();
        let mut user = s.chart().unwrap().clone();
        user.layout.yaxis.range = Some((-1.0, 1.0));
        user.traces[0].visible = Visibility::Visible;
        user.traces[1].visible = Visibility::Hidden;
        s.observe_chart(user);

        let controls = LineControls {
            slope_exp: 2.0,
            ..LineControls::default()
        };
        let r = s.handle(controls).unwrap();
        assert_eq!(r.chart.layout.title, "slope 4");
        assert_eq!(r.chart.layout.yaxis.range, Some((-1.0, 1.0)));
        assert_eq!(r.chart.traces[0].visible, Visibility::Visible);
        assert_eq!(r.chart.traces[1].visible, Visibility::Hidden);
        assert_eq!(r.chart.traces[1].points[1], Point::new(1.0, 4.0));
        assert_eq!(s.simulation_count(), 2);
    }

    #[test]
    fn failed_simulation_keeps_last_chart_and_controls() {
        let mut s = session();
        let before = s.render().chart.clone();

        let bad = LineControls {
            slope_exp: 10.0,
            ..LineControls::default()
        };
        assert!(s.handle(bad).is_err());
        assert_eq!(s.chart(), Some(&before));
        assert_eq!(s.controls(), &LineControls::default());
        assert_eq!(s.params().slope, 2.0);
    }

    #[test]
    fn form_fields_patch_indexed_controls() {
        let mut s = session();
        s.handle_form([
            ("offsets[1]", json!("0.5")),
            ("slope_exp", json!("3")),
            ("enabled", json!("off")),
        ])
        .unwrap();

        assert_eq!(s.controls().offsets, [0.0, 0.5]);
        assert_eq!(s.controls().slope_exp, 3.0);
        assert!(!s.controls().enabled);
        assert!(s.render().controls.is_hidden("offsets"));
    }

    #[test]
    fn full_sequence_from_form_replaces_array() {
        let mut s = session();
        s.handle_form([("offsets[0]", json!("1")), ("offsets[1]", json!("-1"))])
            .unwrap();
        assert_eq!(s.controls().offsets, [1.0, -1.0]);
    }

    #[test]
    fn unusable_fields_are_skipped() {
        let mut s = session();
        s.handle_patch(json!({"slope_exp": "steep", "bogus": 1, "offsets": {"0": 0.25}}))
            .unwrap();
        assert_eq!(s.controls().slope_exp, 1.0);
        assert_eq!(s.controls().offsets, [0.25, 0.0]);
    }

    #[test]
    fn non_object_patch_is_an_error() {
        let mut s = session();
        assert!(matches!(
            s.handle_patch(json!([1, 2])),
            Err(DemoError::Serialization(_))
        ));
    }

    #[test]
    fn strict_sessions_reject_gapped_indices() {
        let mut s = session().with_strict_keys(true);
        let err = s.handle_form([("offsets[1]", json!("0.5"))]).unwrap_err();
        assert!(matches!(err, DemoError::MalformedKey { .. }));

        let mut s = session();
        assert!(s.handle_form([("offsets[1]", json!("0.5"))]).is_ok());
    }

    #[test]
    fn scalar_coercion() {
        assert_eq!(coerce_scalar("2".into()), json!(2));
        assert_eq!(coerce_scalar(" -1.5 ".into()), json!(-1.5));
        assert_eq!(coerce_scalar("ON".into()), json!(true));
        assert_eq!(coerce_scalar("mid-riser".into()), json!("mid-riser"));
        assert_eq!(coerce_scalar("NaN".into()), json!("NaN"));
    }
}
