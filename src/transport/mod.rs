use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

mod http;
pub mod scripted;

pub use http::ReqwestTransport;
pub use scripted::{Reply, ScriptedTransport};

pub const INSIGHT_PATH: &str = "/api/get_nature_insight";
pub const VISUALIZATION_PATH: &str = "/api/visualization_data";
pub const RESEARCH_STATS_PATH: &str = "/api/research_stats";

pub fn vote_path(index: u32) -> String {
    format!("/vote_insight/{}", index)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    /// Sent as `application/json` when present.
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(path: &str) -> Self {
        Self {
            method: Method::Get,
            path: path.to_string(),
            body: None,
        }
    }

    pub fn post(path: &str) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            body: None,
        }
    }

    pub fn post_json(path: &str, body: Value) -> Self {
        Self {
            method: Method::Post,
            path: path.to_string(),
            body: Some(body),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// The page's only way to reach the server.
///
/// A returned `Err` means the round trip itself failed; any HTTP status,
/// success or not, comes back as `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError>;
}
