use super::{Requestor, TransportError, WebRequest, WebResponse};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

/// A [`Requestor`] backed by a `reqwest` client.
///
/// Connection pooling and TLS are left to `reqwest`. Responses with a non-2xx HTTP status are
/// reported as a [`TransportError`].
#[derive(Debug, Clone, Default)]
pub struct HttpRequestor {
    client: reqwest::Client,
}

impl HttpRequestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing, preconfigured `reqwest` client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn send(&self, request: WebRequest) -> Result<WebResponse, TransportError> {
        tracing::debug!(
            url = %request.url,
            response_kind = ?request.response_kind,
            body_len = request.body.len(),
            "issuing gRPC-Web request"
        );

        let response = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::new(format!(
                "Server responded with HTTP status {status}"
            )));
        }

        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::new(e.to_string()))?;

        Ok(WebResponse {
            status,
            headers,
            body,
        })
    }
}

impl Requestor for HttpRequestor {
    fn issue(&self, request: WebRequest) -> BoxFuture<'_, Result<WebResponse, TransportError>> {
        self.send(request).boxed()
    }
}
