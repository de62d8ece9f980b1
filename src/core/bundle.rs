use serde::{Deserialize, Serialize};

/// A 2-D data point. Complex samples are stored as `(re, im)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius * e^{j angle}`.
    pub fn polar(radius: f64, angle: f64) -> Self {
        Self::new(radius * angle.cos(), radius * angle.sin())
    }

    /// Rotate about the origin by `angle` radians.
    pub fn rotated(self, angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new(self.x * c - self.y * s, self.x * s + self.y * c)
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// What a series means to the chart; drives its default visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    /// The model itself (constellation, characteristic curve).
    #[default]
    Primary,
    /// Supporting data such as noisy received samples.
    Auxiliary,
    /// Text annotations placed near primary points.
    Annotation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    #[default]
    #[serde(rename = "lines")]
    Lines,
    #[serde(rename = "markers")]
    Markers,
    #[serde(rename = "lines+markers")]
    LinesMarkers,
    #[serde(rename = "text")]
    Text,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl MarkerStyle {
    pub fn color(color: impl Into<String>) -> Self {
        Self {
            size: None,
            color: Some(color.into()),
        }
    }

    pub fn with_size(mut self, size: f32) -> Self {
        self.size = Some(size);
        self
    }
}

/// One named coordinate series of a simulation result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub role: SeriesRole,
    pub mode: DisplayMode,
    pub points: Vec<Point>,
    /// Per-point text, same length as `points` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker: Option<MarkerStyle>,
}

impl Series {
    pub fn new(name: impl Into<String>, role: SeriesRole, mode: DisplayMode, points: Vec<Point>) -> Self {
        Self {
            name: name.into(),
            role,
            mode,
            points,
            labels: None,
            marker: None,
        }
    }

    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_marker(mut self, marker: MarkerStyle) -> Self {
        self.marker = Some(marker);
        self
    }
}

/// The result of one simulation run. Replaced wholesale on recomputation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputBundle {
    pub title: String,
    pub series: Vec<Series>,
}

impl OutputBundle {
    pub fn new(title: impl Into<String>, series: Vec<Series>) -> Self {
        Self {
            title: title.into(),
            series,
        }
    }

    pub fn series_named(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_by_quarter_turn() {
        let p = Point::new(1.0, 0.0).rotated(std::f64::consts::FRAC_PI_2);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn display_mode_uses_renderer_names() {
        let s = serde_json::to_string(&DisplayMode::LinesMarkers).unwrap();
        assert_eq!(s, "\"lines+markers\"");
    }

    #[test]
    fn lookup_by_series_name() {
        let b = OutputBundle::new(
            "t",
            vec![Series::new("a", SeriesRole::Primary, DisplayMode::Lines, vec![])],
        );
        assert!(b.series_named("a").is_some());
        assert!(b.series_named("b").is_none());
    }
}
