use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, header};
use serde::Serialize;
use url::Url;

use crate::error::{ClientError, Result};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Outgoing request, independent of the transport that will send it.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// Build a fresh request. A body is serialized as UTF-8 JSON; no body means no
/// content and no content type.
pub fn build_request<B>(method: Method, url: Url, body: Option<&B>) -> Result<ApiRequest>
where
    B: Serialize + ?Sized,
{
    let mut headers = HeaderMap::new();

    let body = match body {
        Some(body) => {
            let json = serde_json::to_vec(body).map_err(ClientError::RequestBody)?;
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(JSON_CONTENT_TYPE),
            );
            Some(Bytes::from(json))
        }
        None => None,
    };

    Ok(ApiRequest {
        method,
        url,
        headers,
        body,
    })
}
