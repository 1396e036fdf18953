//! Deterministic transport that answers from a per-path script.
//!
//! Used by the test suites and for running the page offline. Every request is
//! recorded so callers can assert on what went over the wire.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::error::ClientError;
use crate::transport::{HttpRequest, HttpResponse, Transport};

pub enum Reply {
    Status { status: u16, body: String },
    /// The round trip fails before any response arrives.
    Fail(String),
    /// Held until the paired sender delivers the real reply. Dropping the
    /// sender without sending fails the request; never sending hangs it.
    Gated(oneshot::Receiver<Reply>),
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Reply::Status {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16, body: Value) -> Self {
        Reply::Status {
            status,
            body: body.to_string(),
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Reply::Status {
            status,
            body: body.to_string(),
        }
    }

    pub fn fail(reason: &str) -> Self {
        Reply::Fail(reason.to_string())
    }

    pub fn gated() -> (oneshot::Sender<Reply>, Reply) {
        let (tx, rx) = oneshot::channel();
        (tx, Reply::Gated(rx))
    }
}

#[derive(Default)]
pub struct ScriptedTransport {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ScriptedTransport::push`].
    pub fn reply(self, path: &str, reply: Reply) -> Self {
        self.push(path, reply);
        self
    }

    /// Queue a reply for the next request to `path`.
    pub fn push(&self, path: &str, reply: Reply) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.entry(path.to_string()).or_default().push_back(reply);
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.sent.lock().map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        let path = req.path.clone();
        self.sent
            .lock()
            .map_err(|_| ClientError::NetworkOrParse("transport log poisoned".into()))?
            .push(req);
        let next = self
            .replies
            .lock()
            .map_err(|_| ClientError::NetworkOrParse("transport script poisoned".into()))?
            .get_mut(&path)
            .and_then(|queue| queue.pop_front());

        let mut reply = next
            .ok_or_else(|| ClientError::NetworkOrParse(format!("no scripted reply for {}", path)))?;
        loop {
            match reply {
                Reply::Status { status, body } => return Ok(HttpResponse { status, body }),
                Reply::Fail(reason) => return Err(ClientError::NetworkOrParse(reason)),
                Reply::Gated(rx) => {
                    reply = rx
                        .await
                        .map_err(|_| ClientError::NetworkOrParse("gate dropped".into()))?;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn replies_are_consumed_in_order() {
        let transport = ScriptedTransport::new()
            .reply("/a", Reply::ok(json!({"n": 1})))
            .reply("/a", Reply::status(500, json!({"n": 2})));

        let first = transport.send(HttpRequest::get("/a")).await.unwrap();
        let second = transport.send(HttpRequest::get("/a")).await.unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(second.status, 500);
        assert!(transport.send(HttpRequest::get("/a")).await.is_err());
        assert_eq!(transport.request_count(), 3);
    }

    #[tokio::test]
    async fn gated_reply_waits_for_release() {
        let (tx, gated) = Reply::gated();
        let transport = ScriptedTransport::new().reply("/slow", gated);
        let pending = transport.send(HttpRequest::post("/slow"));
        tx.send(Reply::ok(json!({"done": true}))).ok();
        let resp = pending.await.unwrap();
        assert_eq!(resp.body, r#"{"done":true}"#);
    }

    #[tokio::test]
    async fn dropped_gate_fails_request() {
        let (tx, gated) = Reply::gated();
        let transport = ScriptedTransport::new().reply("/slow", gated);
        drop(tx);
        assert!(transport.send(HttpRequest::get("/slow")).await.is_err());
    }
}
