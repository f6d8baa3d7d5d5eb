use std::fmt;
use std::sync::Arc;

use halifax_core::{ApiResponse, DomainError, ErrorKind};
use http::{HeaderValue, Method, StatusCode, header::AUTHORIZATION};
use serde::Serialize;
use serde::de::{DeserializeOwned, IgnoredAny};
use url::Url;

use crate::error::{ClientError, Result};
use crate::request::{ApiRequest, build_request};
use crate::transport::{ReqwestTransport, Transport};

// Upper bound on how much of an unreadable body goes into the log.
const LOGGED_BODY_LIMIT: usize = 2048;

/// Base for typed clients of Halifax APIs.
///
/// Concrete clients hold one of these and call [`HalifaxClient::get`] and
/// friends. Each call is one attempt: build, send, unwrap the envelope.
///
/// ```ignore
/// struct OrdersClient {
///     inner: HalifaxClient,
/// }
///
/// impl OrdersClient {
///     async fn order(&self, id: u64) -> halifax_http::Result<Option<Order>> {
///         self.inner.get(&format!("orders/{id}")).await
///     }
/// }
/// ```
#[derive(Clone)]
pub struct HalifaxClient {
    name: Arc<str>,
    base_url: Url,
    transport: Arc<dyn Transport>,
    bearer_token: Option<HeaderValue>,
}

impl fmt::Debug for HalifaxClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HalifaxClient")
            .field("name", &self.name)
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl HalifaxClient {
    /// Client named `name` (used in diagnostics) talking to `base_url` over reqwest.
    pub fn new(name: impl Into<String>, base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)?;
        Ok(Self::with_transport(
            name,
            base_url,
            Arc::new(ReqwestTransport::default()),
        ))
    }

    pub fn with_transport(
        name: impl Into<String>,
        base_url: Url,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            name: Arc::from(name.into()),
            base_url: with_trailing_slash(base_url),
            transport,
            bearer_token: None,
        }
    }

    /// Send `Authorization: Bearer <token>` with every request.
    pub fn with_bearer_token(mut self, token: &str) -> Result<Self> {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
        value.set_sensitive(true);
        self.bearer_token = Some(value);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` against the base URL. Relative paths keep the base path.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Build a request for `path`, with the client's credentials attached.
    pub fn request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<ApiRequest>
    where
        B: Serialize + ?Sized,
    {
        let mut request = build_request(method, self.url(path)?, body)?;
        if let Some(token) = &self.bearer_token {
            request.headers.insert(AUTHORIZATION, token.clone());
        }
        Ok(request)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let request = self.request::<()>(Method::GET, path, None)?;
        self.send(request).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::POST, path, Some(body))?;
        self.send(request).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PUT, path, Some(body))?;
        self.send(request).await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.request(Method::PATCH, path, Some(body))?;
        self.send(request).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let request = self.request::<()>(Method::DELETE, path, None)?;
        self.send(request).await
    }

    /// Send one request and unwrap the envelope.
    ///
    /// - 2xx: `data` of the envelope; `Ok(None)` when the server sent none
    /// - 400 / 401 / 404 with an error message: [`ClientError::Domain`]
    /// - any other status: [`ClientError::Unsuccessful`]
    /// - body not matching the envelope, or a blank error message: [`ClientError::ResponseUnreadable`]
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Option<T>> {
        let url = request.url.clone();

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(source) => {
                tracing::error!(client = %self.name, %url, error = %source, "request failed");
                return Err(ClientError::Transport {
                    client: self.name.to_string(),
                    url: url.to_string(),
                    source,
                });
            }
        };

        let status = response.status;

        if status.is_success() {
            return match serde_json::from_slice::<ApiResponse<T>>(&response.body) {
                Ok(envelope) => Ok(envelope.into_data()),
                Err(err) => {
                    tracing::error!(
                        client = %self.name,
                        %url,
                        status = status.as_u16(),
                        error = %err,
                        body = %logged_body(&response.body),
                        "error parsing the response"
                    );
                    Err(self.unreadable(&url))
                }
            };
        }

        Err(self.failure(&url, status, &response.body))
    }

    fn failure(&self, url: &Url, status: StatusCode, body: &[u8]) -> ClientError {
        let Some(kind) = ErrorKind::from_status(status) else {
            return self.unsuccessful(url, status);
        };

        let envelope = match serde_json::from_slice::<ApiResponse<IgnoredAny>>(body) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::error!(
                    client = %self.name,
                    %url,
                    status = status.as_u16(),
                    error = %err,
                    body = %logged_body(body),
                    "error parsing the response"
                );
                return self.unreadable(url);
            }
        };

        let Some(message) = envelope.error_message() else {
            tracing::warn!(
                client = %self.name,
                %url,
                status = status.as_u16(),
                body = %logged_body(body),
                "response model doesn't have error information"
            );
            return self.unreadable(url);
        };

        let Some(err) = DomainError::from_kind(kind, message) else {
            return self.unsuccessful(url, status);
        };

        tracing::debug!(client = %self.name, %url, status = status.as_u16(), error = %err, "business error");
        ClientError::Domain(err)
    }

    fn unsuccessful(&self, url: &Url, status: StatusCode) -> ClientError {
        tracing::error!(
            client = %self.name,
            %url,
            status = status.as_u16(),
            "unsuccessful request"
        );
        ClientError::Unsuccessful {
            client: self.name.to_string(),
            url: url.to_string(),
            status,
        }
    }

    fn unreadable(&self, url: &Url) -> ClientError {
        ClientError::ResponseUnreadable {
            client: self.name.to_string(),
            url: url.to_string(),
        }
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn logged_body(body: &[u8]) -> String {
    let end = body.len().min(LOGGED_BODY_LIMIT);
    let mut text = String::from_utf8_lossy(&body[..end]).into_owned();
    if body.len() > end {
        text.push_str("...");
    }
    text
}
