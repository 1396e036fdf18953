//! JSON fetch shared by every data path, plus the per-operation policy that
//! decides whether a failure reaches the user or only the log.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ClientError;
use crate::logging::{log_suppressed, Domain};
use crate::transport::{HttpRequest, Transport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchPolicy {
    pub surface_errors: bool,
}

impl FetchPolicy {
    /// Failures are returned to the caller for display.
    pub const SURFACED: Self = Self { surface_errors: true };
    /// Failures are logged and replaced by "no result".
    pub const SILENT: Self = Self { surface_errors: false };

    /// Apply the policy to a finished fetch. Wiring errors always propagate.
    pub fn settle<T>(
        &self,
        domain: Domain,
        operation: &str,
        result: Result<T, ClientError>,
    ) -> Result<Option<T>, ClientError> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(err @ (ClientError::MissingElement(_) | ClientError::Dom(_))) => Err(err),
            Err(err) if self.surface_errors => Err(err),
            Err(err) => {
                log_suppressed(domain, operation, &err.to_string());
                Ok(None)
            }
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Send `req` and decode the body.
///
/// A 2xx body decodes as `T`. Any other status must carry `{ "error": .. }`
/// and becomes [`ClientError::ServerRejected`]; an undecodable error body is
/// a parse failure like any other.
pub async fn fetch_json<T: DeserializeOwned>(
    transport: &dyn Transport,
    req: HttpRequest,
) -> Result<T, ClientError> {
    let resp = transport.send(req).await?;
    if resp.is_success() {
        return resp.json();
    }
    let body: ErrorBody = resp.json()?;
    Err(ClientError::ServerRejected {
        status: resp.status,
        message: body.error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{Reply, ScriptedTransport};
    use serde_json::{json, Value};

    #[test]
    fn silent_policy_swallows_runtime_errors() {
        let out: Result<Option<u8>, _> = FetchPolicy::SILENT.settle(
            Domain::Chart,
            "test",
            Err(ClientError::NetworkOrParse("down".into())),
        );
        assert_eq!(out, Ok(None));
    }

    #[test]
    fn silent_policy_keeps_wiring_errors() {
        let out: Result<Option<u8>, _> = FetchPolicy::SILENT.settle(
            Domain::Vote,
            "test",
            Err(ClientError::MissingElement("votes-1".into())),
        );
        assert!(out.is_err());
    }

    #[test]
    fn surfaced_policy_returns_errors() {
        let out: Result<Option<u8>, _> = FetchPolicy::SURFACED.settle(
            Domain::Insight,
            "test",
            Err(ClientError::UserInputInvalid),
        );
        assert_eq!(out, Err(ClientError::UserInputInvalid));
    }

    #[tokio::test]
    async fn error_status_uses_error_field() {
        let transport =
            ScriptedTransport::new().reply("/x", Reply::status(500, json!({"error": "model offline"})));
        let err = fetch_json::<Value>(&transport, HttpRequest::get("/x")).await.unwrap_err();
        assert_eq!(
            err,
            ClientError::ServerRejected {
                status: 500,
                message: "model offline".into()
            }
        );
    }

    #[tokio::test]
    async fn error_status_without_json_is_parse_failure() {
        let transport = ScriptedTransport::new().reply("/x", Reply::raw(502, "Bad Gateway"));
        let err = fetch_json::<Value>(&transport, HttpRequest::get("/x")).await.unwrap_err();
        assert!(matches!(err, ClientError::NetworkOrParse(_)));
    }
}
