use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde::Deserialize;
use serde_json::json;

use crate::dom::{with_dom, SharedDom};
use crate::error::ClientError;
use crate::fetch::{fetch_json, FetchPolicy};
use crate::logging::{log, log_insight_transition, obj, Domain, Level};
use crate::render::render_result;
use crate::state::{InsightRequest, InsightResult, ResponseOrdering, TextTrust};
use crate::transport::{HttpRequest, Transport, INSIGHT_PATH};

pub const RESULT_REGION: &str = "insight-result";

/// The insight flow shows every failure to the user.
const INSIGHT_POLICY: FetchPolicy = FetchPolicy::SURFACED;

#[derive(Deserialize)]
struct InsightBody {
    response: String,
}

/// Drives the query → fetch → render cycle for the insight result region.
///
/// Overlapping submissions are not cancelled. With
/// [`ResponseOrdering::LastCompleted`] the last response to arrive is shown;
/// with [`ResponseOrdering::LastIssued`] responses from superseded
/// submissions are dropped.
pub struct InsightClient {
    transport: Arc<dyn Transport>,
    dom: SharedDom,
    region: String,
    trust: TextTrust,
    ordering: ResponseOrdering,
    current: Mutex<InsightResult>,
    issued: AtomicU64,
}

impl InsightClient {
    pub fn new(transport: Arc<dyn Transport>, dom: SharedDom, trust: TextTrust, ordering: ResponseOrdering) -> Self {
        Self {
            transport,
            dom,
            region: RESULT_REGION.to_string(),
            trust,
            ordering,
            current: Mutex::new(InsightResult::Idle),
            issued: AtomicU64::new(0),
        }
    }

    pub fn current(&self) -> Result<InsightResult, ClientError> {
        self.current
            .lock()
            .map(|s| s.clone())
            .map_err(|_| ClientError::Dom("insight state poisoned".into()))
    }

    /// Submit `query_text` and return the state this call left rendered.
    ///
    /// Empty input fails immediately without a request. Otherwise Loading is
    /// rendered before the request goes out and stays until a response (or a
    /// transport failure) arrives.
    pub async fn submit(&self, query_text: &str) -> Result<InsightResult, ClientError> {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let Some(request) = InsightRequest::new(query_text) else {
            let state = failure_state(ClientError::UserInputInvalid)?;
            self.transition(state.clone(), seq)?;
            return Ok(state);
        };

        self.transition(InsightResult::Loading, seq)?;
        let fetched = self.fetch(&request).await;

        if self.is_stale(seq) {
            log(
                Level::Info,
                Domain::Insight,
                "stale_response_dropped",
                obj(&[
                    ("request_seq", json!(seq)),
                    ("latest_seq", json!(self.issued.load(Ordering::SeqCst))),
                ]),
            );
            return self.current();
        }

        let state = match INSIGHT_POLICY.settle(Domain::Insight, INSIGHT_PATH, fetched) {
            Ok(Some(text)) => InsightResult::Success { text },
            Ok(None) => return self.current(),
            Err(err) => failure_state(err)?,
        };
        self.transition(state.clone(), seq)?;
        Ok(state)
    }

    async fn fetch(&self, request: &InsightRequest) -> Result<String, ClientError> {
        let body = serde_json::to_value(request)?;
        let fetched: InsightBody =
            fetch_json(self.transport.as_ref(), HttpRequest::post_json(INSIGHT_PATH, body)).await?;
        Ok(fetched.response)
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.ordering == ResponseOrdering::LastIssued && self.issued.load(Ordering::SeqCst) != seq
    }

    fn transition(&self, state: InsightResult, seq: u64) -> Result<(), ClientError> {
        let html = render_result(&state, self.trust);
        with_dom(&self.dom, |dom| dom.set_inner_html(&self.region, &html))?;
        log_insight_transition(state.label(), state.is_terminal(), html.len(), seq);
        let mut current = self
            .current
            .lock()
            .map_err(|_| ClientError::Dom("insight state poisoned".into()))?;
        *current = state;
        Ok(())
    }
}

/// Turn a surfaced error into the Failure state, or propagate wiring errors.
fn failure_state(err: ClientError) -> Result<InsightResult, ClientError> {
    match err.user_facing() {
        Some((kind, message)) => Ok(InsightResult::Failure { kind, message }),
        None => Err(err),
    }
}
