use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;
use crate::transport::{RESEARCH_STATS_PATH, VISUALIZATION_PATH};

pub mod config;
pub mod loader;

pub use config::{ChartConfig, ChartKind, PlacedChart};
pub use loader::ChartDataLoader;

use config::{area_line, percent_bar, percent_radar, share_doughnut, FOREST, LAVENDER, TEAL};

pub const EFFECTIVENESS_MOUNT: &str = "effectivenessChart";
pub const COST_MOUNT: &str = "costChart";
pub const SATISFACTION_MOUNT: &str = "satisfactionChart";
pub const PUBLICATIONS_MOUNT: &str = "publicationsChart";
pub const SUCCESS_RATES_MOUNT: &str = "successRatesChart";
pub const GLOBAL_IMPACT_MOUNT: &str = "globalImpactChart";

pub const CHART_MOUNTS: [&str; 6] = [
    EFFECTIVENESS_MOUNT,
    COST_MOUNT,
    SATISFACTION_MOUNT,
    PUBLICATIONS_MOUNT,
    SUCCESS_RATES_MOUNT,
    GLOBAL_IMPACT_MOUNT,
];

/// A JSON dataset served by one endpoint and the charts it feeds.
pub trait ChartDataset: DeserializeOwned + Send {
    const ENDPOINT: &'static str;

    /// Reject payloads whose value and label sequences disagree in length.
    fn validate(&self) -> Result<(), ClientError>;

    fn charts(&self) -> Vec<PlacedChart>;
}

fn check_aligned(name: &str, labels: usize, values: usize) -> Result<(), ClientError> {
    if labels != values {
        return Err(ClientError::NetworkOrParse(format!(
            "{}: {} values for {} labels",
            name, values, labels
        )));
    }
    Ok(())
}

/// Per-category scores, all index-aligned with `categories`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisualizationData {
    pub categories: Vec<String>,
    pub effectiveness: Vec<f64>,
    pub implementation_cost: Vec<f64>,
    pub user_satisfaction: Vec<f64>,
}

impl ChartDataset for VisualizationData {
    const ENDPOINT: &'static str = VISUALIZATION_PATH;

    fn validate(&self) -> Result<(), ClientError> {
        let n = self.categories.len();
        check_aligned("effectiveness", n, self.effectiveness.len())?;
        check_aligned("implementation_cost", n, self.implementation_cost.len())?;
        check_aligned("user_satisfaction", n, self.user_satisfaction.len())
    }

    fn charts(&self) -> Vec<PlacedChart> {
        let labels = &self.categories;
        vec![
            PlacedChart {
                mount: EFFECTIVENESS_MOUNT,
                config: percent_radar(labels, "Effectiveness Score", &self.effectiveness, FOREST, false),
            },
            PlacedChart {
                mount: COST_MOUNT,
                config: percent_bar(labels, "Implementation Cost", &self.implementation_cost, TEAL),
            },
            PlacedChart {
                mount: SATISFACTION_MOUNT,
                config: area_line(labels, "User Satisfaction", &self.user_satisfaction, LAVENDER, true),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResearchStats {
    pub publications: Series,
    pub success_rates: Series,
    /// Shares, rendered proportionally. Need not sum to 100.
    pub global_impact: Series,
}

impl ChartDataset for ResearchStats {
    const ENDPOINT: &'static str = RESEARCH_STATS_PATH;

    fn validate(&self) -> Result<(), ClientError> {
        check_aligned("publications", self.publications.labels.len(), self.publications.data.len())?;
        check_aligned("success_rates", self.success_rates.labels.len(), self.success_rates.data.len())?;
        check_aligned("global_impact", self.global_impact.labels.len(), self.global_impact.data.len())
    }

    fn charts(&self) -> Vec<PlacedChart> {
        let mut publications = area_line(
            &self.publications.labels,
            "Number of Publications",
            &self.publications.data,
            TEAL,
            false,
        );
        publications.options.responsive = Some(true);
        publications.options.plugins.title = Some(config::TitleOption {
            display: true,
            text: "Biomimicry Research Growth".to_string(),
        });
        vec![
            PlacedChart {
                mount: PUBLICATIONS_MOUNT,
                config: publications,
            },
            PlacedChart {
                mount: SUCCESS_RATES_MOUNT,
                config: percent_radar(
                    &self.success_rates.labels,
                    "Success Rate (%)",
                    &self.success_rates.data,
                    LAVENDER,
                    true,
                ),
            },
            PlacedChart {
                mount: GLOBAL_IMPACT_MOUNT,
                config: share_doughnut(&self.global_impact.labels, &self.global_impact.data),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn research_fixture() -> ResearchStats {
        serde_json::from_value(json!({
            "publications": {"labels": ["2020", "2021"], "data": [45, 68]},
            "success_rates": {"labels": ["Clinical Trials"], "data": [78]},
            "global_impact": {"labels": ["Europe", "Asia"], "data": [28, 25]}
        }))
        .unwrap()
    }

    #[test]
    fn visualization_maps_series_to_fixed_kinds() {
        let data: VisualizationData = serde_json::from_value(json!({
            "categories": ["Antimicrobial"],
            "effectiveness": [90],
            "implementation_cost": [40],
            "user_satisfaction": [85]
        }))
        .unwrap();
        data.validate().unwrap();
        let charts = data.charts();
        let kinds: Vec<_> = charts.iter().map(|c| (c.mount, c.config.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (EFFECTIVENESS_MOUNT, ChartKind::Radar),
                (COST_MOUNT, ChartKind::Bar),
                (SATISFACTION_MOUNT, ChartKind::Line),
            ]
        );
        assert_eq!(charts[0].config.values(), &[90.0]);
        assert_eq!(charts[1].config.values(), &[40.0]);
        assert_eq!(charts[2].config.values(), &[85.0]);
        for chart in &charts {
            assert_eq!(chart.config.data.labels, vec!["Antimicrobial".to_string()]);
        }
    }

    #[test]
    fn misaligned_visualization_is_rejected() {
        let data = VisualizationData {
            categories: vec!["a".into(), "b".into()],
            effectiveness: vec![1.0, 2.0],
            implementation_cost: vec![1.0],
            user_satisfaction: vec![1.0, 2.0],
        };
        assert!(matches!(data.validate(), Err(ClientError::NetworkOrParse(_))));
    }

    #[test]
    fn research_scales_by_series_meaning() {
        let stats = research_fixture();
        stats.validate().unwrap();
        let charts = stats.charts();
        assert_eq!(charts.len(), 3);

        let publications = &charts[0].config;
        assert_eq!(publications.kind, ChartKind::Line);
        assert!(publications.options.scales.is_empty());
        assert_eq!(
            publications.options.plugins.title.as_ref().map(|t| t.text.as_str()),
            Some("Biomimicry Research Growth")
        );

        let success = &charts[1].config;
        assert_eq!(success.kind, ChartKind::Radar);
        assert_eq!(success.options.scales["r"].max, Some(100.0));

        let impact = &charts[2].config;
        assert_eq!(impact.kind, ChartKind::Doughnut);
        assert!(impact.options.scales.is_empty());
        assert_eq!(impact.values(), &[28.0, 25.0]);
    }

    #[test]
    fn missing_field_fails_to_parse() {
        let parsed = serde_json::from_value::<ResearchStats>(json!({"publications": {"labels": [], "data": []}}));
        assert!(parsed.is_err());
    }
}
