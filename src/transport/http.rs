use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::ClientError;
use crate::logging::{v_str, ProfileScope};
use crate::state::Config;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport};

/// HTTP transport against the site origin.
pub struct ReqwestTransport {
    client: Client,
    base: Url,
}

impl ReqwestTransport {
    pub fn new(cfg: &Config) -> Result<Self, ClientError> {
        let base = Url::parse(&cfg.base_url)
            .map_err(|e| ClientError::NetworkOrParse(format!("bad base url {}: {}", cfg.base_url, e)))?;
        // No timeout unless configured: a hung request stays in flight.
        let mut builder = Client::builder();
        if let Some(timeout) = cfg.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::NetworkOrParse(format!("bad path {}: {}", path, e)))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        let url = self.url_for(&req.path)?;
        let _scope = ProfileScope::with_context("http_round_trip", &[("path", v_str(&req.path))]);

        let mut builder = match req.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        if let Some(body) = &req.body {
            builder = builder.json(body);
        }
        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_resolve_against_origin() {
        let cfg = Config {
            base_url: "http://localhost:5000/".to_string(),
            ..Config::default()
        };
        let transport = ReqwestTransport::new(&cfg).unwrap();
        assert_eq!(
            transport.url_for("/api/research_stats").unwrap().as_str(),
            "http://localhost:5000/api/research_stats"
        );
        assert_eq!(
            transport.url_for("/vote_insight/7").unwrap().as_str(),
            "http://localhost:5000/vote_insight/7"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let cfg = Config {
            base_url: "not a url".to_string(),
            ..Config::default()
        };
        assert!(ReqwestTransport::new(&cfg).is_err());
    }
}
