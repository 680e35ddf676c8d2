//! Transport capability and its per-target implementations

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, Either};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::body::WireBody;
use crate::error::TransportError;
use crate::method::Method;
use crate::response::Response;

#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
mod reqwest_transport;

#[cfg(target_arch = "wasm32")]
mod fetch_transport;

#[cfg(target_arch = "wasm32")]
pub use fetch_transport::FetchTransport;
#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
pub use reqwest_transport::ReqwestTransport;

/// Options forwarded to the transport without interpretation
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Token that aborts the in-flight request when cancelled
    pub cancel: Option<CancellationToken>,
    /// Upper bound on the whole request, for transports that support it
    pub timeout: Option<Duration>,
    /// Transport-specific settings, e.g. `credentials` or `mode` for `fetch()`
    pub extensions: serde_json::Map<String, Value>,
}

impl RequestOptions {
    /// Attach a cancellation token
    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attach a timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Attach a transport-specific setting
    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }
}

/// Fully normalized request handed to a [`Transport`]
#[derive(Debug)]
pub struct TransportRequest {
    /// HTTP method
    pub method: Method,
    /// Resolved URL, absolute or relative to the ambient document
    pub url: String,
    /// Canonical headers
    pub headers: HeaderMap,
    /// Encoded body; always `None` for GET and HEAD
    pub body: Option<WireBody>,
    /// Pass-through options
    pub options: RequestOptions,
}

/// Performs the actual network call
///
/// Any status code is a successful round-trip. Errors are reserved for
/// failures below HTTP: DNS, connect, TLS, cancellation.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait Transport: Send + Sync + Debug {
    /// Send the request and buffer the response
    async fn send(&self, request: TransportRequest) -> Result<Response, TransportError>;
}

/// Transport for the compilation target: `fetch()` on wasm32, reqwest elsewhere
#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
pub fn default_transport() -> Arc<dyn Transport> {
    Arc::new(ReqwestTransport::new())
}

/// Transport for the compilation target: `fetch()` on wasm32, reqwest elsewhere
#[cfg(target_arch = "wasm32")]
pub fn default_transport() -> Arc<dyn Transport> {
    Arc::new(FetchTransport)
}

/// Set the body's implied `Content-Type` when the caller chose none
#[cfg_attr(
    not(any(feature = "reqwest", target_arch = "wasm32")),
    allow(dead_code)
)]
pub(crate) fn apply_implied_content_type(headers: &mut HeaderMap, body: &WireBody) {
    if headers.contains_key(CONTENT_TYPE) {
        return;
    }
    if let Some(value) = body
        .implied_content_type()
        .and_then(|content_type| HeaderValue::from_str(&content_type).ok())
    {
        headers.insert(CONTENT_TYPE, value);
    }
}

/// Race `request` against the cancellation token, if any
#[cfg_attr(
    not(any(feature = "reqwest", target_arch = "wasm32")),
    allow(dead_code)
)]
pub(crate) async fn cancellable<F, T>(
    cancel: Option<&CancellationToken>,
    request: F,
) -> Result<T, TransportError>
where
    F: Future<Output = Result<T, TransportError>>,
{
    let Some(token) = cancel else {
        return request.await;
    };

    if token.is_cancelled() {
        return Err(TransportError::Cancelled);
    }

    let cancelled = token.cancelled();
    futures::pin_mut!(request);
    futures::pin_mut!(cancelled);

    match future::select(request, cancelled).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => Err(TransportError::Cancelled),
    }
}
