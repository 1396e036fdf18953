//! Error taxonomy for the page controller.

use thiserror::Error;

/// Shown when a query is empty or whitespace only.
pub const EMPTY_QUERY_MESSAGE: &str =
    "Please enter a health challenge to get nature-inspired insights.";

/// Shown for any network or parse failure in the insight flow, whatever the cause.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to get insights. Please try again later.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The query was empty or whitespace. No request was issued.
    #[error("empty query")]
    UserInputInvalid,

    /// The server answered with a non-success status and a structured error.
    #[error("server rejected request ({status}): {message}")]
    ServerRejected { status: u16, message: String },

    /// The request never completed or the body could not be decoded.
    #[error("network or parse failure: {0}")]
    NetworkOrParse(String),

    /// A required element is absent from the page. This is a wiring bug.
    #[error("missing element: {0}")]
    MissingElement(String),

    /// The host DOM could not be accessed.
    #[error("dom error: {0}")]
    Dom(String),
}

/// Coarse classification carried by a failed insight state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    UserInputInvalid,
    ServerRejected,
    NetworkOrParse,
}

impl ClientError {
    /// Map a runtime error onto the failure kind and the message the user sees.
    /// Programming errors have no user-facing kind.
    pub fn user_facing(&self) -> Option<(FailureKind, String)> {
        match self {
            ClientError::UserInputInvalid => {
                Some((FailureKind::UserInputInvalid, EMPTY_QUERY_MESSAGE.to_string()))
            }
            ClientError::ServerRejected { message, .. } => {
                Some((FailureKind::ServerRejected, message.clone()))
            }
            ClientError::NetworkOrParse(_) => {
                Some((FailureKind::NetworkOrParse, GENERIC_FAILURE_MESSAGE.to_string()))
            }
            ClientError::MissingElement(_) | ClientError::Dom(_) => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::NetworkOrParse(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::NetworkOrParse(err.to_string())
    }
}
