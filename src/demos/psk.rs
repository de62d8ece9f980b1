use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::bundle::{DisplayMode, MarkerStyle, OutputBundle, Series, SeriesRole};
use crate::cache::Simulator;
use crate::chart::AxisId;
use crate::controls::{order_from_exponent, phase_marks, ControlView, ParameterController, SliderSpec};
use crate::error::{DemoError, DemoResult};
use crate::merge::{AxisDefaults, ChartDefaults};
use crate::models::{AwgnChannel, PskModulation};
use crate::prng::Prng;
use crate::session::Demo;

pub const ORDER_EXP: SliderSpec = SliderSpec::new("order_exp", 1.0, 4.0, 1.0, 1.0);
pub const AMPLITUDE: SliderSpec = SliderSpec::new("amplitude", 0.1, 2.0, 0.01, 1.0);
pub const PHASE: SliderSpec = SliderSpec::new("phase", -PI, PI, PI / 16.0, 0.0);
pub const NOISE_DB: SliderSpec = SliderSpec::new("noise_db", -40.0, 10.0, 0.1, -40.0);

const SYMBOLS_PER_POINT: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PskControls {
    pub order_exp: f64,
    pub amplitude: f64,
    pub phase: f64,
    pub noise_db: f64,
}

impl Default for PskControls {
    fn default() -> Self {
        Self {
            order_exp: ORDER_EXP.default,
            amplitude: AMPLITUDE.default,
            phase: PHASE.default,
            noise_db: NOISE_DB.default,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PskParams {
    pub order: usize,
    pub amplitude: f64,
    pub phase: f64,
    pub noise_db: f64,
}

pub struct PskController;

impl ParameterController for PskController {
    type Controls = PskControls;
    type Params = PskParams;

    fn normalize(c: &PskControls) -> PskParams {
        PskParams {
            order: order_from_exponent(ORDER_EXP.clamp_int(c.order_exp)),
            amplitude: AMPLITUDE.clamp(c.amplitude),
            phase: PHASE.clamp(c.phase),
            noise_db: NOISE_DB.clamp(c.noise_db),
        }
    }

    fn control_view(c: &PskControls) -> ControlView {
        let p = Self::normalize(c);
        ControlView::default()
            .label(ORDER_EXP.key, format!("Order: {}", p.order))
            .label(AMPLITUDE.key, format!("Amplitude: {:.2}", p.amplitude))
            .label(PHASE.key, format!("Phase offset: {:.2}", p.phase))
            .label(NOISE_DB.key, format!("Noise power: {:.2} dB", p.noise_db))
            .marks(PHASE.key, phase_marks(p.order))
    }
}

/// Noisy PSK constellation.
#[derive(Debug)]
pub struct PskDemo {
    rng: Prng,
}

impl PskDemo {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            rng: Prng::from_seed(seed),
        }
    }
}

impl Simulator for PskDemo {
    type Params = PskParams;

    fn simulate(&mut self, p: &PskParams) -> DemoResult<OutputBundle> {
        if !p.noise_db.is_finite() {
            return Err(DemoError::invalid("noise_db", "must be finite"));
        }
        let psk = PskModulation::new(p.order, p.amplitude, p.phase)?;
        let channel = AwgnChannel::from_db(p.noise_db);

        let symbols = psk.random_symbols(SYMBOLS_PER_POINT * psk.order(), &mut self.rng);
        let received = channel.apply(&symbols, &mut self.rng);

        Ok(OutputBundle::new(
            psk.to_string(),
            vec![
                Series::new("Gaussian clouds", SeriesRole::Auxiliary, DisplayMode::Markers, received)
                    .with_marker(MarkerStyle::color("rgba(0, 0, 255, 0.5)").with_size(2.0)),
                Series::new("Constellation", SeriesRole::Primary, DisplayMode::Markers, psk.constellation())
                    .with_marker(MarkerStyle::color("red")),
            ],
        ))
    }
}

impl Demo for PskDemo {
    type Controller = PskController;
    const NAME: &'static str = "psk";

    fn chart_defaults(_: &PskParams) -> ChartDefaults {
        ChartDefaults::new(
            AxisDefaults::symmetric("Re", 2.1),
            AxisDefaults::symmetric("Im", 2.1).anchored_to(AxisId::X),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Visibility;
    use crate::session::DemoSession;

    #[test]
    fn normalize_maps_exponent_to_order() {
        let p = PskController::normalize(&PskControls {
            order_exp: 2.0,
            ..PskControls::default()
        });
        assert_eq!(p.order, 4);

        let p = PskController::normalize(&PskControls {
            order_exp: 9.0,
            phase: 10.0,
            ..PskControls::default()
        });
        assert_eq!(p.order, 16);
        assert_eq!(p.phase, PI);
    }

    #[test]
    fn control_view_labels_and_marks() {
        let view = PskController::control_view(&PskControls {
            order_exp: 2.0,
            ..PskControls::default()
        });
        assert_eq!(view.labels["order_exp"], "Order: 4");
        assert_eq!(view.labels["amplitude"], "Amplitude: 1.00");
        assert_eq!(view.labels["phase"], "Phase offset: 0.00");
        assert_eq!(view.labels["noise_db"], "Noise power: -40.00 dB");
        assert!(view.marks["phase"].iter().any(|m| m.label == "π/4"));
    }

    #[test]
    fn bundle_has_clouds_then_constellation() {
        let p = PskController::normalize(&PskControls {
            order_exp: 2.0,
            ..PskControls::default()
        });
        let bundle = PskDemo::new(Some(7)).simulate(&p).unwrap();

        assert_eq!(bundle.series.len(), 2);
        assert_eq!(bundle.series[0].role, SeriesRole::Auxiliary);
        assert_eq!(bundle.series[0].points.len(), 800);
        assert_eq!(bundle.series[1].points.len(), 4);
        assert_eq!(bundle.title, "4-PSK (amplitude 1.00, phase offset 0.00)");
    }

    #[test]
    fn non_finite_noise_is_rejected() {
        let p = PskParams {
            order: 2,
            amplitude: 1.0,
            phase: 0.0,
            noise_db: f64::NAN,
        };
        let err = PskDemo::new(Some(1)).simulate(&p).unwrap_err();
        assert!(matches!(err, DemoError::InvalidParameter { name: "noise_db", .. }));
    }

    #[test]
    fn noise_change_resimulates_once_and_keeps_the_view() {
        let mut session = DemoSession::new(PskDemo::new(Some(3)), PskControls::default()).unwrap();
        let first = session.render().chart.clone();
        assert_eq!(first.traces[0].visible, Visibility::LegendOnly);
        assert_eq!(first.traces[0].points.len(), 400);

        let mut user = first.clone();
        user.layout.xaxis.range = Some((-0.4, 0.4));
        user.traces[0].visible = Visibility::Visible;
        session.observe_chart(user.clone());

        let noisier = PskControls {
            noise_db: -20.0,
            ..PskControls::default()
        };
        let chart = session.handle(noisier.clone()).unwrap().chart.clone();
        assert_eq!(session.simulation_count(), 2);
        assert_eq!(chart.layout.xaxis.range, user.layout.xaxis.range);
        assert_eq!(chart.layout.yaxis.range, first.layout.yaxis.range);
        assert_eq!(chart.traces[0].visible, Visibility::Visible);
        assert_ne!(chart.traces[0].points, first.traces[0].points);

        // Same controls again: no new simulation.
        session.handle(noisier).unwrap();
        assert_eq!(session.simulation_count(), 2);
    }
}
