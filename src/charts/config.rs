//! Chart configurations in the shape Chart.js consumes, and the fixed visual
//! encodings for every chart on the page.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Radar,
    Bar,
    Line,
    Doughnut,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::Radar => "radar",
            ChartKind::Bar => "bar",
            ChartKind::Line => "line",
            ChartKind::Doughnut => "doughnut",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const FOREST: Rgba = Rgba::new(44, 119, 68, 1.0);
pub const TEAL: Rgba = Rgba::new(75, 192, 192, 1.0);
pub const LAVENDER: Rgba = Rgba::new(153, 102, 255, 1.0);

/// Part-of-whole palette, assigned to labels in order and cycled.
pub const SHARE_PALETTE: [Rgba; 5] = [
    Rgba::new(255, 99, 132, 0.8),
    Rgba::new(54, 162, 235, 0.8),
    Rgba::new(255, 206, 86, 0.8),
    Rgba::new(75, 192, 192, 0.8),
    Rgba::new(153, 102, 255, 0.8),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Fill {
    One(Rgba),
    PerPoint(Vec<Rgba>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    pub background_color: Fill,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_background_color: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

impl Dataset {
    fn new(label: Option<&str>, data: &[f64], background: Fill) -> Self {
        Self {
            label: label.map(str::to_string),
            data: data.to_vec(),
            background_color: background,
            border_color: None,
            point_background_color: None,
            border_width: None,
            fill: None,
            tension: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScale {
    pub begin_at_zero: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl AxisScale {
    pub fn percent() -> Self {
        Self {
            begin_at_zero: true,
            max: Some(100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleOption {
    pub display: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendOption {
    pub position: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Plugins {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend: Option<LegendOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsive: Option<bool>,
    /// Axis id (`r` for radial, `y` for cartesian) to bounds. Empty means the
    /// chart scales to its data.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub scales: BTreeMap<String, AxisScale>,
    #[serde(skip_serializing_if = "is_default_plugins")]
    pub plugins: Plugins,
}

fn is_default_plugins(p: &Plugins) -> bool {
    *p == Plugins::default()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: ChartOptions,
}

impl ChartConfig {
    /// Number of values plotted by the first dataset.
    pub fn points(&self) -> usize {
        self.data.datasets.first().map_or(0, |d| d.data.len())
    }

    pub fn values(&self) -> &[f64] {
        self.data
            .datasets
            .first()
            .map_or(&[][..], |d| d.data.as_slice())
    }
}

/// A chart configuration bound to the element it renders into.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedChart {
    pub mount: &'static str,
    pub config: ChartConfig,
}

fn chart(kind: ChartKind, labels: &[String], dataset: Dataset, options: ChartOptions) -> ChartConfig {
    ChartConfig {
        kind,
        data: ChartData {
            labels: labels.to_vec(),
            datasets: vec![dataset],
        },
        options,
    }
}

fn percent_scale(axis: &str) -> BTreeMap<String, AxisScale> {
    BTreeMap::from([(axis.to_string(), AxisScale::percent())])
}

/// Radar over a 0..100 radial scale.
pub fn percent_radar(labels: &[String], label: &str, data: &[f64], color: Rgba, responsive: bool) -> ChartConfig {
    let mut ds = Dataset::new(Some(label), data, Fill::One(color.with_alpha(0.2)));
    ds.border_color = Some(color);
    ds.point_background_color = Some(color);
    let options = ChartOptions {
        responsive: responsive.then_some(true),
        scales: percent_scale("r"),
        ..ChartOptions::default()
    };
    chart(ChartKind::Radar, labels, ds, options)
}

/// Bars over a 0..100 y axis.
pub fn percent_bar(labels: &[String], label: &str, data: &[f64], color: Rgba) -> ChartConfig {
    let mut ds = Dataset::new(Some(label), data, Fill::One(color.with_alpha(0.2)));
    ds.border_color = Some(color);
    ds.border_width = Some(1);
    let options = ChartOptions {
        scales: percent_scale("y"),
        ..ChartOptions::default()
    };
    chart(ChartKind::Bar, labels, ds, options)
}

/// Filled, smoothed line. `bounded` pins the y axis to 0..100.
pub fn area_line(labels: &[String], label: &str, data: &[f64], color: Rgba, bounded: bool) -> ChartConfig {
    let mut ds = Dataset::new(Some(label), data, Fill::One(color.with_alpha(0.2)));
    ds.border_color = Some(color);
    ds.fill = Some(true);
    ds.tension = Some(0.4);
    let options = if bounded {
        ChartOptions {
            scales: percent_scale("y"),
            ..ChartOptions::default()
        }
    } else {
        ChartOptions::default()
    };
    chart(ChartKind::Line, labels, ds, options)
}

/// Part-of-whole doughnut, one palette color per label.
pub fn share_doughnut(labels: &[String], data: &[f64]) -> ChartConfig {
    let colors = (0..labels.len())
        .map(|i| SHARE_PALETTE[i % SHARE_PALETTE.len()])
        .collect();
    let ds = Dataset::new(None, data, Fill::PerPoint(colors));
    let options = ChartOptions {
        responsive: Some(true),
        plugins: Plugins {
            legend: Some(LegendOption {
                position: "right".to_string(),
            }),
            ..Plugins::default()
        },
        ..ChartOptions::default()
    };
    chart(ChartKind::Doughnut, labels, ds, options)
}
