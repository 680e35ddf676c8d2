//! reqwest-based transport for native targets

use async_trait::async_trait;

use super::{apply_implied_content_type, cancellable, Transport, TransportRequest};
use crate::error::TransportError;
use crate::response::Response;

/// reqwest-based transport
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with default reqwest settings
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Create a transport from a configured reqwest::Client
    pub fn from_reqwest(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<Response, TransportError> {
        let TransportRequest {
            method,
            url,
            mut headers,
            body,
            options,
        } = request;

        let mut builder = self.inner.request(method.into(), url.as_str());

        if let Some(body) = body {
            apply_implied_content_type(&mut headers, &body);
            let bytes = body
                .into_bytes()
                .await
                .map_err(|e| TransportError::Other(format!("Failed to read body: {}", e)))?;
            builder = builder.body(bytes);
        }

        builder = builder.headers(headers);

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        cancellable(options.cancel.as_ref(), async move {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();
            Ok::<_, TransportError>(Response::new(status, headers, body))
        })
        .await
    }
}
