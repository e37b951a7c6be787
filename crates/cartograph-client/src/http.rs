use crate::{GraphSource, RawGraph, SourceError};
use async_trait::async_trait;
use cartograph_core::InstanceId;
use tracing::debug;

/// Fetches neighborhoods from a knowledge-graph HTTP API.
///
/// Expects the endpoint `GET {base}/instances/{id}/graph` to answer with a
/// [`RawGraph`] JSON body.
pub struct HttpGraphSource {
    base_url: String,
    token: Option<String>,
    client: reqwest::Client,
}

impl HttpGraphSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            token: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

#[async_trait]
impl GraphSource for HttpGraphSource {
    async fn fetch_graph(&self, root: &InstanceId) -> Result<RawGraph, SourceError> {
        let url = format!("{}/instances/{}/graph", self.base_url, root);
        debug!(%url, "fetching raw graph");

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        decode_response(status, &body)
    }
}

/// Maps a response to a payload: non-success statuses keep their body for
/// display, success bodies must parse as a graph.
fn decode_response(status: reqwest::StatusCode, body: &str) -> Result<RawGraph, SourceError> {
    if !status.is_success() {
        return Err(SourceError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }
    RawGraph::from_json(body)
}
