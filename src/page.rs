use std::sync::Arc;

use serde_json::json;

use crate::charts::{ChartDataLoader, ResearchStats, VisualizationData};
use crate::dom::{with_dom, SharedDom};
use crate::error::ClientError;
use crate::insight::InsightClient;
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::reveal::{IntersectionEntry, RevealAnimator};
use crate::state::{Config, InsightResult, VoteRecord};
use crate::transport::Transport;
use crate::vote::VoteClient;

pub const QUERY_INPUT: &str = "health-query";
pub const EXPANDED_CLASS: &str = "expanded";

/// Every component of the page, built once at startup over one DOM and one
/// transport.
pub struct Page {
    dom: SharedDom,
    insight: InsightClient,
    votes: VoteClient,
    visualization: ChartDataLoader<VisualizationData>,
    research: ChartDataLoader<ResearchStats>,
    solution_reveal: RevealAnimator,
    case_reveal: RevealAnimator,
}

impl Page {
    pub fn new(cfg: &Config, transport: Arc<dyn Transport>, dom: SharedDom) -> Self {
        Self {
            insight: InsightClient::new(
                transport.clone(),
                dom.clone(),
                cfg.insight_trust,
                cfg.insight_ordering,
            ),
            votes: VoteClient::new(transport.clone(), dom.clone(), cfg.pulse),
            visualization: ChartDataLoader::new(transport.clone(), dom.clone()),
            research: ChartDataLoader::new(transport, dom.clone()),
            solution_reveal: RevealAnimator::solution_cards(cfg.reveal_threshold, dom.clone()),
            case_reveal: RevealAnimator::case_cards(cfg.reveal_threshold, dom.clone()),
            dom,
        }
    }

    /// Hide both card groups, then fetch both datasets concurrently and mount
    /// their charts. Returns the number of charts mounted.
    pub async fn load(&mut self) -> Result<usize, ClientError> {
        let solutions = self.solution_reveal.observe_group()?;
        let cases = self.case_reveal.observe_group()?;

        let (visualization, research) = tokio::join!(self.visualization.load(), self.research.load());
        let mounted = visualization? + research?;
        log(
            Level::Info,
            Domain::System,
            "page_loaded",
            obj(&[
                ("charts", json!(mounted)),
                ("solution_cards", json!(solutions)),
                ("case_cards", json!(cases)),
            ]),
        );
        Ok(mounted)
    }

    pub async fn submit_query(&self, query_text: &str) -> Result<InsightResult, ClientError> {
        self.insight.submit(query_text).await
    }

    /// Submit whatever is currently typed in the query input.
    pub async fn submit_from_input(&self) -> Result<InsightResult, ClientError> {
        let query = with_dom(&self.dom, |dom| dom.value_of(QUERY_INPUT))?;
        self.insight.submit(&query).await
    }

    pub async fn vote(&self, index: u32) -> Result<Option<VoteRecord>, ClientError> {
        self.votes.vote(index).await
    }

    /// Expand or collapse the solution card for `category`. Returns whether
    /// the card is expanded afterwards.
    pub fn toggle_details(&self, category: &str) -> Result<bool, ClientError> {
        let expanded = with_dom(&self.dom, |dom| {
            let card = dom
                .find_by_attr("data-category", category)
                .ok_or_else(|| ClientError::MissingElement(format!("[data-category={}]", category)))?;
            dom.toggle_class(&card, EXPANDED_CLASS)
        })?;
        log(
            Level::Debug,
            Domain::System,
            "details_toggled",
            obj(&[("category", v_str(category)), ("expanded", json!(expanded))]),
        );
        Ok(expanded)
    }

    /// Route intersection reports to both reveal groups. Returns how many
    /// elements were revealed.
    pub fn on_intersection(&mut self, entries: &[IntersectionEntry]) -> Result<usize, ClientError> {
        let solutions = self.solution_reveal.on_intersection(entries)?;
        let cases = self.case_reveal.on_intersection(entries)?;
        Ok(solutions.len() + cases.len())
    }

    pub fn insight(&self) -> &InsightClient {
        &self.insight
    }

    pub fn votes(&self) -> &VoteClient {
        &self.votes
    }
}
