use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;

use crate::error::TransportError;
use crate::request::ApiRequest;

/// Response as seen by the client core: status plus raw body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// Sends a request and returns the response; the only suspension point of a call.
///
/// Implementations may be shared across concurrent calls. Dropping the
/// returned future cancels the exchange.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ApiRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(TransportError::new)?;
        let status = response.status();
        let body = response.bytes().await.map_err(TransportError::new)?;

        Ok(TransportResponse { status, body })
    }
}
