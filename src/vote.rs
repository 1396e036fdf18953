use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::time::sleep;

use crate::dom::{with_dom, SharedDom};
use crate::error::ClientError;
use crate::fetch::{fetch_json, FetchPolicy};
use crate::logging::{log, log_suppressed, obj, Domain, Level};
use crate::state::VoteRecord;
use crate::transport::{vote_path, HttpRequest, Transport};

pub const VOTED_CLASS: &str = "voted";

/// Vote failures never reach the user.
const VOTE_POLICY: FetchPolicy = FetchPolicy::SILENT;

pub fn count_element(index: u32) -> String {
    format!("votes-{}", index)
}

#[derive(Deserialize)]
struct VoteBody {
    votes: u64,
}

/// Submits votes and shows the server's count. Counts are never incremented
/// locally; each successful response overwrites the displayed value.
pub struct VoteClient {
    transport: Arc<dyn Transport>,
    dom: SharedDom,
    pulse: Duration,
    counts: Mutex<HashMap<u32, u64>>,
}

impl VoteClient {
    pub fn new(transport: Arc<dyn Transport>, dom: SharedDom, pulse: Duration) -> Self {
        Self {
            transport,
            dom,
            pulse,
            counts: Mutex::new(HashMap::new()),
        }
    }

    /// Last count the server reported for `index`, if any vote succeeded.
    pub fn last_known(&self, index: u32) -> Option<u64> {
        self.counts.lock().ok().and_then(|c| c.get(&index).copied())
    }

    /// Vote for the insight at `index`.
    ///
    /// Returns `Ok(None)` when the request failed; the page is left untouched
    /// and the failure is only logged. A missing `votes-{index}` element is
    /// reported before any request is made. Must run inside a tokio runtime.
    pub async fn vote(&self, index: u32) -> Result<Option<VoteRecord>, ClientError> {
        let count_id = count_element(index);
        let button = with_dom(&self.dom, |dom| {
            if !dom.contains(&count_id) {
                return Err(ClientError::MissingElement(count_id.clone()));
            }
            Ok(dom.parent_of(&count_id))
        })?;

        let path = vote_path(index);
        let fetched = fetch_json::<VoteBody>(self.transport.as_ref(), HttpRequest::post(&path))
            .await
            .map(|body| body.votes);
        let Some(votes) = VOTE_POLICY.settle(Domain::Vote, &path, fetched)? else {
            return Ok(None);
        };

        with_dom(&self.dom, |dom| dom.set_text(&count_id, &votes.to_string()))?;
        if let Ok(mut counts) = self.counts.lock() {
            counts.insert(index, votes);
        }
        if let Some(button) = button {
            self.start_pulse(button)?;
        }
        log(
            Level::Info,
            Domain::Vote,
            "counted",
            obj(&[("index", json!(index)), ("votes", json!(votes))]),
        );
        Ok(Some(VoteRecord { index, votes }))
    }

    /// Mark `element` as voted and clear it after the pulse duration. Every
    /// vote schedules its own clear; a later vote does not extend an earlier
    /// pulse.
    fn start_pulse(&self, element: String) -> Result<(), ClientError> {
        with_dom(&self.dom, |dom| dom.add_class(&element, VOTED_CLASS))?;

        let dom = self.dom.clone();
        let pulse = self.pulse;
        tokio::spawn(async move {
            sleep(pulse).await;
            if let Err(err) = with_dom(&dom, |dom| dom.remove_class(&element, VOTED_CLASS)) {
                log_suppressed(Domain::Vote, "pulse_clear", &err.to_string());
            }
        });
        Ok(())
    }
}
