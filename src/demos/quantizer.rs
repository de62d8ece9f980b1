use serde::{Deserialize, Serialize};

use crate::bundle::{DisplayMode, MarkerStyle, OutputBundle, Point, Series, SeriesRole};
use crate::cache::Simulator;
use crate::chart::AxisId;
use crate::controls::{ControlView, ParameterController, SliderSpec};
use crate::error::DemoResult;
use crate::merge::{AxisDefaults, ChartDefaults};
use crate::models::{linspace, QuantizerChoice, UniformQuantizer};
use crate::session::Demo;

pub const NUM_LEVELS: SliderSpec = SliderSpec::new("num_levels", 2.0, 32.0, 1.0, 4.0);
pub const INPUT_PEAK: SliderSpec = SliderSpec::new("input_peak", 0.1, 2.0, 0.01, 1.0);

const CURVE_POINTS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuantizerControls {
    pub num_levels: f64,
    pub input_peak: f64,
    pub choice: QuantizerChoice,
}

impl Default for QuantizerControls {
    fn default() -> Self {
        Self {
            num_levels: NUM_LEVELS.default,
            input_peak: INPUT_PEAK.default,
            choice: QuantizerChoice::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuantizerParams {
    pub num_levels: usize,
    pub input_peak: f64,
    pub choice: QuantizerChoice,
}

pub struct QuantizerController;

impl ParameterController for QuantizerController {
    type Controls = QuantizerControls;
    type Params = QuantizerParams;

    fn normalize(c: &QuantizerControls) -> QuantizerParams {
        QuantizerParams {
            num_levels: NUM_LEVELS.clamp_int(c.num_levels) as usize,
            input_peak: INPUT_PEAK.clamp(c.input_peak),
            choice: c.choice,
        }
    }

    fn control_view(c: &QuantizerControls) -> ControlView {
        let p = Self::normalize(c);
        ControlView::default()
            .label(NUM_LEVELS.key, format!("Number of levels: {}", p.num_levels))
            .label(INPUT_PEAK.key, format!("Input peak: {:.2}", p.input_peak))
            .label("choice", p.choice.display_name())
    }
}

/// Input/output characteristic of a uniform quantizer.
#[derive(Debug, Default)]
pub struct QuantizerDemo;

impl Simulator for QuantizerDemo {
    type Params = QuantizerParams;

    fn simulate(&mut self, p: &QuantizerParams) -> DemoResult<OutputBundle> {
        let quantizer = UniformQuantizer::new(p.num_levels, p.input_peak, p.choice)?;
        let peak = quantizer.input_peak();
        let curve = linspace(-2.0 * peak, 2.0 * peak, CURVE_POINTS)
            .into_iter()
            .map(|x| Point::new(x, quantizer.quantize(x)))
            .collect();

        Ok(OutputBundle::new(
            quantizer.to_string(),
            vec![Series::new("Characteristic curve", SeriesRole::Primary, DisplayMode::Lines, curve)
                .with_marker(MarkerStyle::color("red"))],
        ))
    }
}

impl Demo for QuantizerDemo {
    type Controller = QuantizerController;
    const NAME: &'static str = "quantizer";

    fn chart_defaults(_: &QuantizerParams) -> ChartDefaults {
        ChartDefaults::new(
            AxisDefaults::symmetric("Input", 2.1),
            AxisDefaults::symmetric("Output", 2.1).anchored_to(AxisId::X),
        )
        .with_hovermode("closest")
    }
}
