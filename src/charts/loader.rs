use std::marker::PhantomData;
use std::sync::Arc;

use crate::charts::{ChartDataset, PlacedChart};
use crate::dom::{with_dom, SharedDom};
use crate::error::ClientError;
use crate::fetch::{fetch_json, FetchPolicy};
use crate::logging::{log_chart_mount, Domain};
use crate::transport::{HttpRequest, Transport};

/// Fetches one dataset shape and mounts the charts it feeds.
///
/// Dashboards fail quietly by default: a failed fetch leaves the mounts blank
/// and is only logged.
pub struct ChartDataLoader<D: ChartDataset> {
    transport: Arc<dyn Transport>,
    dom: SharedDom,
    policy: FetchPolicy,
    _dataset: PhantomData<fn() -> D>,
}

impl<D: ChartDataset> ChartDataLoader<D> {
    pub fn new(transport: Arc<dyn Transport>, dom: SharedDom) -> Self {
        Self {
            transport,
            dom,
            policy: FetchPolicy::SILENT,
            _dataset: PhantomData,
        }
    }

    pub fn with_policy(mut self, policy: FetchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns how many charts were mounted; zero when the fetch failed.
    pub async fn load(&self) -> Result<usize, ClientError> {
        let fetched = self.fetch().await;
        let Some(dataset) = self.policy.settle(Domain::Chart, D::ENDPOINT, fetched)? else {
            return Ok(0);
        };
        mount_charts(&self.dom, &dataset.charts())
    }

    async fn fetch(&self) -> Result<D, ClientError> {
        let dataset: D = fetch_json(self.transport.as_ref(), HttpRequest::get(D::ENDPOINT)).await?;
        dataset.validate()?;
        Ok(dataset)
    }
}

/// Hand each configuration to its mount element.
pub fn mount_charts(dom: &SharedDom, charts: &[PlacedChart]) -> Result<usize, ClientError> {
    with_dom(dom, |dom| {
        for chart in charts {
            dom.mount_chart(chart.mount, &chart.config)?;
            log_chart_mount(chart.mount, chart.config.kind.as_str(), chart.config.points());
        }
        Ok(charts.len())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{
        ResearchStats, VisualizationData, COST_MOUNT, EFFECTIVENESS_MOUNT, GLOBAL_IMPACT_MOUNT,
        PUBLICATIONS_MOUNT, SATISFACTION_MOUNT, SUCCESS_RATES_MOUNT,
    };
    use crate::dom::MemoryDom;
    use crate::transport::{Reply, ScriptedTransport, RESEARCH_STATS_PATH, VISUALIZATION_PATH};
    use serde_json::json;
    use std::sync::Mutex;

    fn setup(transport: ScriptedTransport) -> (Arc<ScriptedTransport>, Arc<Mutex<MemoryDom>>, SharedDom) {
        let transport = Arc::new(transport);
        let dom = Arc::new(Mutex::new(MemoryDom::page_layout(0)));
        let shared: SharedDom = dom.clone();
        (transport, dom, shared)
    }

    #[tokio::test]
    async fn empty_categories_render_empty_charts() {
        let (transport, dom, shared) = setup(ScriptedTransport::new().reply(
            VISUALIZATION_PATH,
            Reply::ok(json!({
                "categories": [], "effectiveness": [],
                "implementation_cost": [], "user_satisfaction": []
            })),
        ));
        let loader = ChartDataLoader::<VisualizationData>::new(transport, shared);
        assert_eq!(loader.load().await.unwrap(), 3);
        let dom = dom.lock().unwrap();
        assert_eq!(dom.chart(COST_MOUNT).unwrap().points(), 0);
    }

    #[tokio::test]
    async fn failed_fetch_leaves_mounts_blank() {
        let (transport, dom, shared) = setup(
            ScriptedTransport::new().reply(RESEARCH_STATS_PATH, Reply::fail("connection refused")),
        );
        let loader = ChartDataLoader::<ResearchStats>::new(transport.clone(), shared);
        assert_eq!(loader.load().await.unwrap(), 0);
        assert!(dom.lock().unwrap().chart(GLOBAL_IMPACT_MOUNT).is_none());
        assert_eq!(transport.requests()[0], HttpRequest::get(RESEARCH_STATS_PATH));
    }

    #[tokio::test]
    async fn misaligned_series_render_nothing() {
        let (transport, dom, shared) = setup(ScriptedTransport::new().reply(
            VISUALIZATION_PATH,
            Reply::ok(json!({
                "categories": ["a", "b"], "effectiveness": [1, 2],
                "implementation_cost": [3], "user_satisfaction": [4, 5]
            })),
        ));
        let loader = ChartDataLoader::<VisualizationData>::new(transport, shared);
        assert_eq!(loader.load().await, Ok(0));
        let dom = dom.lock().unwrap();
        for mount in [EFFECTIVENESS_MOUNT, COST_MOUNT, SATISFACTION_MOUNT] {
            assert!(dom.chart(mount).is_none(), "{}", mount);
        }
    }

    #[tokio::test]
    async fn server_error_status_renders_nothing() {
        let (transport, dom, shared) = setup(ScriptedTransport::new().reply(
            RESEARCH_STATS_PATH,
            Reply::status(500, json!({"error": "stats unavailable"})),
        ));
        let loader = ChartDataLoader::<ResearchStats>::new(transport, shared);
        assert_eq!(loader.load().await, Ok(0));
        let dom = dom.lock().unwrap();
        for mount in [PUBLICATIONS_MOUNT, SUCCESS_RATES_MOUNT, GLOBAL_IMPACT_MOUNT] {
            assert!(dom.chart(mount).is_none(), "{}", mount);
        }
    }

    #[tokio::test]
    async fn non_json_body_renders_nothing() {
        let (transport, dom, shared) =
            setup(ScriptedTransport::new().reply(VISUALIZATION_PATH, Reply::raw(200, "<html>")));
        let loader = ChartDataLoader::<VisualizationData>::new(transport, shared);
        assert_eq!(loader.load().await, Ok(0));
        assert!(dom.lock().unwrap().chart(EFFECTIVENESS_MOUNT).is_none());
    }

    #[tokio::test]
    async fn empty_research_series_render_empty_charts() {
        let (transport, dom, shared) = setup(ScriptedTransport::new().reply(
            RESEARCH_STATS_PATH,
            Reply::ok(json!({
                "publications": {"labels": [], "data": []},
                "success_rates": {"labels": [], "data": []},
                "global_impact": {"labels": [], "data": []}
            })),
        ));
        let loader = ChartDataLoader::<ResearchStats>::new(transport, shared);
        assert_eq!(loader.load().await, Ok(3));
        let dom = dom.lock().unwrap();
        for mount in [PUBLICATIONS_MOUNT, SUCCESS_RATES_MOUNT, GLOBAL_IMPACT_MOUNT] {
            assert_eq!(dom.chart(mount).map(|c| c.points()), Some(0), "{}", mount);
        }
    }

    #[tokio::test]
    async fn surfaced_policy_reports_bad_payload() {
        let (transport, _dom, shared) =
            setup(ScriptedTransport::new().reply(VISUALIZATION_PATH, Reply::ok(json!({"categories": 3}))));
        let loader =
            ChartDataLoader::<VisualizationData>::new(transport, shared).with_policy(FetchPolicy::SURFACED);
        assert!(matches!(loader.load().await, Err(ClientError::NetworkOrParse(_))));
    }

    #[tokio::test]
    async fn missing_mount_is_a_wiring_error() {
        let transport = Arc::new(ScriptedTransport::new().reply(
            VISUALIZATION_PATH,
            Reply::ok(json!({
                "categories": ["a"], "effectiveness": [1],
                "implementation_cost": [2], "user_satisfaction": [3]
            })),
        ));
        let shared: SharedDom = Arc::new(Mutex::new(MemoryDom::new()));
        let loader = ChartDataLoader::<VisualizationData>::new(transport, shared);
        assert!(matches!(loader.load().await, Err(ClientError::MissingElement(_))));
    }
}
