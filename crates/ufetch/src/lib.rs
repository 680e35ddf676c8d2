//! Cross-environment HTTP client
//!
//! One [`Client`] API for native targets and the browser. The client turns
//! loosely-typed inputs (a URL or nothing, a method name, JSON, text, bytes or
//! form data, headers in any common shape) into a normalized request, hands it
//! to a [`Transport`], and returns the response whatever its status.
//!
//! - Native targets use [`ReqwestTransport`] (feature `reqwest`, on by default).
//! - `wasm32` uses `FetchTransport` over the global `fetch()`.
//!
//! # Example
//!
//! ```no_run
//! use serde_json::json;
//! use ufetch::{Client, RequestParams};
//!
//! async fn example() -> ufetch::Result<()> {
//!     let mut client = Client::new(Some("https://api.example.com".to_string()), None);
//!     client.set_bearer_authorization("token");
//!
//!     let response = client
//!         .get(RequestParams::new().url("https://api.example.com/items").data(json!({"page": 1})))
//!         .await?;
//!     println!("{}", response.status());
//!     Ok(())
//! }
//! ```

mod body;
mod client;
mod compose;
mod config;
mod error;
mod headers;
mod method;
mod multipart;
mod navigator;
mod response;
mod state;
mod transport;

pub use body::{encode, BodyStream, RequestData, WireBody};
pub use client::{Client, RequestParams};
pub use compose::compose;
pub use config::{BasicAuth, ClientConfig};
pub use error::{Error, Result, TransportError};
pub use headers::{normalize, Headers};
pub use method::Method;
pub use multipart::MultipartForm;
#[cfg(target_arch = "wasm32")]
pub use navigator::BrowserNavigator;
pub use navigator::Navigator;
pub use response::Response;
pub use state::{ClientState, EmptyQuery, UnauthorizedScope};
#[cfg(any(feature = "reqwest", target_arch = "wasm32"))]
pub use transport::default_transport;
#[cfg(target_arch = "wasm32")]
pub use transport::FetchTransport;
#[cfg(all(feature = "reqwest", not(target_arch = "wasm32")))]
pub use transport::ReqwestTransport;
pub use transport::{RequestOptions, Transport, TransportRequest};
pub use tokio_util::sync::CancellationToken;
