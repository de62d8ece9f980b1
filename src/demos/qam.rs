use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::bundle::{DisplayMode, MarkerStyle, OutputBundle, Series, SeriesRole};
use crate::cache::Simulator;
use crate::chart::AxisId;
use crate::controls::{order_from_exponent, phase_marks, ControlView, ParameterController, SliderSpec};
use crate::error::{DemoError, DemoResult};
use crate::merge::{AxisDefaults, ChartDefaults};
use crate::models::{bit_string, AwgnChannel, QamLabeling, QamModulation};
use crate::prng::Prng;
use crate::session::Demo;

pub const ORDER_EXP: SliderSpec = SliderSpec::new("order_exp", 1.0, 3.0, 1.0, 1.0);
pub const BASE_AMPLITUDE: SliderSpec = SliderSpec::new("base_amplitude", 0.5, 1.5, 0.01, 1.0);
pub const PHASE: SliderSpec = SliderSpec::new("phase", -PI, PI, PI / 16.0, 0.0);
pub const NOISE_DB: SliderSpec = SliderSpec::new("noise_db", -40.0, 10.0, 0.1, -40.0);

const SYMBOLS_PER_POINT: usize = 100;
const LABEL_OFFSET: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QamControls {
    pub order_exp: [f64; 2],
    pub base_amplitude: [f64; 2],
    pub phase: f64,
    pub labeling: QamLabeling,
    pub noise_db: f64,
    /// Mirror the first dimension onto the second.
    pub square: bool,
}

impl Default for QamControls {
    fn default() -> Self {
        Self {
            order_exp: [ORDER_EXP.default; 2],
            base_amplitude: [BASE_AMPLITUDE.default; 2],
            phase: PHASE.default,
            labeling: QamLabeling::default(),
            noise_db: NOISE_DB.default,
            square: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QamParams {
    pub orders: (usize, usize),
    pub base_amplitudes: (f64, f64),
    pub phase: f64,
    pub labeling: QamLabeling,
    pub noise_db: f64,
}

impl QamParams {
    pub fn order(&self) -> usize {
        self.orders.0 * self.orders.1
    }
}

pub struct QamController;

impl ParameterController for QamController {
    type Controls = QamControls;
    type Params = QamParams;

    fn normalize(c: &QamControls) -> QamParams {
        let order = |exp: f64| order_from_exponent(ORDER_EXP.clamp_int(exp));
        let m0 = order(c.order_exp[0]);
        let a0 = BASE_AMPLITUDE.clamp(c.base_amplitude[0]);
        let (m1, a1) = if c.square {
            (m0, a0)
        } else {
            (order(c.order_exp[1]), BASE_AMPLITUDE.clamp(c.base_amplitude[1]))
        };

        QamParams {
            orders: (m0, m1),
            base_amplitudes: (a0, a1),
            phase: PHASE.clamp(c.phase),
            labeling: c.labeling,
            noise_db: NOISE_DB.clamp(c.noise_db),
        }
    }

    fn control_view(c: &QamControls) -> ControlView {
        let p = Self::normalize(c);
        let (m0, m1) = p.orders;
        let (a0, a1) = p.base_amplitudes;
        let view = ControlView::default()
            .label(ORDER_EXP.key, format!("Orders: ({m0}, {m1})"))
            .label(BASE_AMPLITUDE.key, format!("Base amplitudes: ({a0:.2}, {a1:.2})"))
            .label(PHASE.key, format!("Phase offset: {:.2}", p.phase))
            .label(NOISE_DB.key, format!("Noise power: {:.2} dB", p.noise_db))
            .label("labeling", p.labeling.display_name())
            .marks(PHASE.key, phase_marks(p.order()));

        if c.square {
            view.hide("order_exp[1]").hide("base_amplitude[1]")
        } else {
            view
        }
    }
}

/// Noisy rectangular QAM constellation with bit labels.
#[derive(Debug)]
pub struct QamDemo {
    rng: Prng,
}

impl QamDemo {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: Prng::from_seed(seed),
        }
    }
}

impl Simulator for QamDemo {
    type Params = QamParams;

    fn simulate(&mut self, p: &QamParams) -> DemoResult<OutputBundle> {
        if !p.noise_db.is_finite() {
            return Err(DemoError::invalid("noise_db", "must be finite"));
        }
        let qam = QamModulation::new(p.orders, p.base_amplitudes, p.phase, p.labeling)?;
        let channel = AwgnChannel::from_db(p.noise_db);

        let symbols = qam.random_symbols(SYMBOLS_PER_POINT * qam.order(), &mut self.rng);
        let received = channel.apply(&symbols, &mut self.rng);

        let constellation = qam.constellation();
        let width = qam.bits_per_symbol();
        let label_points = constellation.iter().map(|pt| pt.offset(0.0, LABEL_OFFSET)).collect();
        let labels = qam.labels().into_iter().map(|l| bit_string(l, width)).collect();

        Ok(OutputBundle::new(
            qam.to_string(),
            vec![
                Series::new("Gaussian clouds", SeriesRole::Auxiliary, DisplayMode::Markers, received)
                    .with_marker(MarkerStyle::color("rgba(0, 0, 255, 0.33)").with_size(2.0)),
                Series::new("Constellation", SeriesRole::Primary, DisplayMode::Markers, constellation)
                    .with_marker(MarkerStyle::color("red")),
                Series::new("Labeling", SeriesRole::Annotation, DisplayMode::Text, label_points)
                    .with_labels(labels),
            ],
        ))
    }
}

impl Demo for QamDemo {
    type Controller = QamController;
    const NAME: &'static str = "qam";

    fn chart_defaults(p: &QamParams) -> ChartDefaults {
        let (m0, m1) = p.orders;
        ChartDefaults::new(
            AxisDefaults::symmetric("Re", 1.5 * m0 as f64 + 1.0).anchored_to(AxisId::Y),
            AxisDefaults::symmetric("Im", 1.5 * m1 as f64 + 1.0),
        )
    }
}
