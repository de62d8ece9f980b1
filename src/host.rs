//! Request dispatch for a host that serves all demo pages.
//!
//! The wire format is newline-delimited JSON, one request or response per
//! line, tagged by `type`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::chart::ChartState;
use crate::config::AppConfig;
use crate::controls::ControlView;
use crate::demos::{DemoKind, PskDemo, QamDemo, QuantizerDemo};
use crate::error::DemoResult;
use crate::session::{Demo, DemoSession};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Inventory of available demos.
    List,
    /// Current chart without changing anything.
    Render { demo: DemoKind },
    /// JSON patch over the demo's raw controls.
    Controls { demo: DemoKind, controls: Value },
    /// Flat form fields with compound keys (`order_exp[1]`, ...).
    Form {
        demo: DemoKind,
        fields: Map<String, Value>,
    },
    /// The renderer reports the chart as the user left it.
    Relayout { demo: DemoKind, chart: ChartState },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemoInfo {
    pub demo: DemoKind,
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
#[allow(clippy::large_enum_variant)]
pub enum Response {
    Render {
        demo: DemoKind,
        chart: ChartState,
        controls: ControlView,
        simulations: u64,
    },
    Demos {
        demos: Vec<DemoInfo>,
    },
    Error {
        message: String,
    },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

enum Action {
    Render,
    Patch(Value),
    Form(Map<String, Value>),
    Relayout(ChartState),
}

/// One session per demo page.
pub struct DemoHost {
    quantizer: DemoSession<QuantizerDemo>,
    psk: DemoSession<PskDemo>,
    qam: DemoSession<QamDemo>,
}

impl DemoHost {
    pub fn new(config: &AppConfig) -> DemoResult<Self> {
        let seed = |kind: DemoKind| config.seed.map(|s| s.wrapping_add(kind as u64));
        let strict = config.strict_form_keys;

        let host = Self {
            quantizer: DemoSession::new(QuantizerDemo, config.quantizer.clone())?.with_strict_keys(strict),
            psk: DemoSession::new(PskDemo::new(seed(DemoKind::Psk)), config.psk.clone())?
                .with_strict_keys(strict),
            qam: DemoSession::new(QamDemo::new(seed(DemoKind::Qam)), config.qam.clone())?
                .with_strict_keys(strict),
        };
        info!(demos = DemoKind::all().len(), strict_form_keys = strict, "demo host ready");
        Ok(host)
    }

    pub fn handle(&mut self, request: Request) -> Response {
        let (demo, action) = match request {
            Request::List => return Self::list(),
            Request::Render { demo } => (demo, Action::Render),
            Request::Controls { demo, controls } => (demo, Action::Patch(controls)),
            Request::Form { demo, fields } => (demo, Action::Form(fields)),
            Request::Relayout { demo, chart } => (demo, Action::Relayout(chart)),
        };

        match demo {
            DemoKind::Quantizer => respond(demo, &mut self.quantizer, action),
            DemoKind::Psk => respond(demo, &mut self.psk, action),
            DemoKind::Qam => respond(demo, &mut self.qam, action),
        }
    }

    /// Parse one request line and answer it; malformed lines get an error response.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                warn!(error = %e, "unparseable request");
                Response::error(format!("invalid request: {e}"))
            }
        }
    }

    fn list() -> Response {
        Response::Demos {
            demos: DemoKind::all()
                .iter()
                .map(|&demo| DemoInfo {
                    demo,
                    title: demo.display_name().to_string(),
                })
                .collect(),
        }
    }
}

fn respond<D: Demo>(demo: DemoKind, session: &mut DemoSession<D>, action: Action) -> Response {
    let result = match action {
        Action::Render => Ok(session.render()),
        Action::Patch(patch) => session.handle_patch(patch),
        Action::Form(fields) => session.handle_form(fields),
        Action::Relayout(chart) => {
            session.observe_chart(chart);
            Ok(session.render())
        }
    };

    match result {
        Ok(render) => {
            let chart = render.chart.clone();
            let controls = render.controls;
            debug!(%demo, traces = chart.traces.len(), "rendered");
            Response::Render {
                demo,
                chart,
                controls,
                simulations: session.simulation_count(),
            }
        }
        Err(e) => Response::error(format!("{demo}: {e}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::Visibility;
    use serde_json::json;

    fn host() -> DemoHost {
        let config = AppConfig {
            seed: Some(9),
            ..AppConfig::default()
        };
        DemoHost::new(&config).unwrap()
    }

    fn rendered(resp: Response) -> (ChartState, ControlView, u64) {
        match resp {
            Response::Render {
                chart,
                controls,
                simulations,
                ..
            } => (chart, controls, simulations),
            other => panic!("expected a render, got {other:?}"),
        }
    }

    #[test]
    fn list_names_every_demo() {
        let resp = host().handle_line(r#"{"type": "List"}"#);
        let Response::Demos { demos } = resp else {
            panic!("expected demos");
        };
        assert_eq!(demos.len(), 3);
        assert_eq!(demos[1].demo, DemoKind::Psk);
    }

    #[test]
    fn form_request_round_trip() {
        let mut host = host();
        let resp = host.handle_line(
            r#"{"type": "Form", "demo": "qam", "fields": {"square": "off", "order_exp[1]": "2"}}"#,
        );
        let (chart, controls, simulations) = rendered(resp);
        assert_eq!(simulations, 2);
        assert_eq!(chart.traces[1].points.len(), 8);
        assert_eq!(controls.labels["order_exp"], "Orders: (2, 4)");
    }

    #[test]
    fn relayout_is_kept_for_the_next_pass() {
        let mut host = host();
        let (mut chart, _, _) = rendered(host.handle(Request::Render { demo: DemoKind::Psk }));
        chart.traces[0].visible = Visibility::Visible;
        chart.layout.yaxis.range = Some((-0.2, 0.2));
        host.handle(Request::Relayout {
            demo: DemoKind::Psk,
            chart,
        });

        let (chart, _, simulations) = rendered(host.handle(Request::Controls {
            demo: DemoKind::Psk,
            controls: json!({"amplitude": 0.5}),
        }));
        assert_eq!(simulations, 2);
        assert_eq!(chart.traces[0].visible, Visibility::Visible);
        assert_eq!(chart.layout.yaxis.range, Some((-0.2, 0.2)));
    }

    #[test]
    fn relayout_accepts_reversed_autorange() {
        let mut host = host();
        let line = r#"{"type": "Relayout", "demo": "quantizer", "chart": {
            "traces": [],
            "layout": {"title": "q", "xaxis": {"title": "Input", "autorange": "reversed"}}
        }}"#;
        let (chart, _, _) = rendered(host.handle_line(line));
        assert_eq!(chart.layout.xaxis.autorange, crate::chart::AutoRange::Reversed);

        let (chart, _, _) = rendered(host.handle(Request::Controls {
            demo: DemoKind::Quantizer,
            controls: json!({"num_levels": 8}),
        }));
        assert_eq!(chart.layout.xaxis.range, Some((2.1, -2.1)));
    }

    #[test]
    fn bad_input_produces_error_responses() {
        let mut host = host();
        assert!(matches!(host.handle_line("not json"), Response::Error { .. }));
        assert!(matches!(
            host.handle_line(r#"{"type": "Render", "demo": "ofdm"}"#),
            Response::Error { .. }
        ));
        assert!(matches!(
            host.handle(Request::Controls {
                demo: DemoKind::Quantizer,
                controls: json!(3),
            }),
            Response::Error { .. }
        ));
    }

    #[test]
    fn responses_are_tagged() {
        let v = serde_json::to_value(Response::error("boom")).unwrap();
        assert_eq!(v, json!({"type": "Error", "message": "boom"}));
    }
}
