use std::time::Duration;

use crate::error::FailureKind;

/// The one current state of the insight result region.
#[derive(Debug, Clone, PartialEq)]
pub enum InsightResult {
    Idle,
    Loading,
    Success { text: String },
    Failure { kind: FailureKind, message: String },
}

impl InsightResult {
    pub fn label(&self) -> &'static str {
        match self {
            InsightResult::Idle => "idle",
            InsightResult::Loading => "loading",
            InsightResult::Success { .. } => "success",
            InsightResult::Failure { .. } => "failure",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, InsightResult::Success { .. } | InsightResult::Failure { .. })
    }
}

/// Validated insight query. Construction rejects empty or whitespace input.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct InsightRequest {
    query: String,
}

impl InsightRequest {
    pub fn new(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }
        Some(Self {
            query: query.to_string(),
        })
    }
}

/// Last server-reported vote count for one community insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteRecord {
    pub index: u32,
    pub votes: u64,
}

/// How server-provided insight text is interpolated into markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTrust {
    Escaped,
    TrustedRichText,
}

/// Which response wins when insight submissions overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOrdering {
    /// Whichever response is processed last is rendered.
    LastCompleted,
    /// Responses of superseded submissions are dropped.
    LastIssued,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub base_url: String,
    pub request_timeout: Option<Duration>,
    pub pulse: Duration,
    pub reveal_threshold: f64,
    pub insight_trust: TextTrust,
    pub insight_ordering: ResponseOrdering,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout: None,
            pulse: Duration::from_millis(1000),
            reveal_threshold: 0.2,
            insight_trust: TextTrust::Escaped,
            insight_ordering: ResponseOrdering::LastCompleted,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("NATURE_BASE_URL").unwrap_or(defaults.base_url),
            request_timeout: parse_timeout_secs(std::env::var("REQUEST_TIMEOUT_SECS").ok().as_deref()),
            pulse: std::env::var("PULSE_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.pulse),
            reveal_threshold: std::env::var("REVEAL_THRESHOLD")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .filter(|t| (0.0..=1.0).contains(t))
                .unwrap_or(defaults.reveal_threshold),
            insight_trust: match std::env::var("INSIGHT_TRUST").as_deref() {
                Ok("trusted") => TextTrust::TrustedRichText,
                _ => TextTrust::Escaped,
            },
            insight_ordering: match std::env::var("INSIGHT_ORDERING").as_deref() {
                Ok("last_issued") => ResponseOrdering::LastIssued,
                _ => ResponseOrdering::LastCompleted,
            },
        }
    }
}

/// Whole seconds, positive. Anything else means no timeout.
fn parse_timeout_secs(raw: Option<&str>) -> Option<Duration> {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}
