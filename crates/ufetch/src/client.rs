//! Request dispatcher and client surface

use std::sync::Arc;

use tracing::instrument;

use crate::body::{encode, RequestData};
use crate::compose::compose;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::headers::{normalize, Headers};
use crate::method::Method;
use crate::navigator::Navigator;
use crate::response::Response;
use crate::state::{ClientState, EmptyQuery, UnauthorizedScope};
use crate::transport::{RequestOptions, Transport, TransportRequest};

/// Options bag accepted by the verb methods
#[derive(Debug, Default)]
pub struct RequestParams {
    /// Target URL; the base URL is used when absent
    pub url: Option<String>,
    /// Query data for GET/HEAD, body for everything else
    pub data: Option<RequestData>,
    /// Per-request headers
    pub headers: Headers,
    /// Pass-through transport options
    pub options: RequestOptions,
}

impl RequestParams {
    /// Empty parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target URL
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the request data
    pub fn data(mut self, data: impl Into<RequestData>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the per-request headers
    pub fn headers(mut self, headers: impl Into<Headers>) -> Self {
        self.headers = headers.into();
        self
    }

    /// Set the pass-through options
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// HTTP client
///
/// Configure it through the `&mut self` setters before issuing requests;
/// requests only need `&self`, so clones can run concurrently.
#[derive(Clone)]
pub struct Client {
    state: ClientState,
    transport: Arc<dyn Transport>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state)
            .field("transport", &self.transport)
            .field("navigator", &self.navigator.is_some())
            .finish()
    }
}

impl Client {
    /// Create a client on the default transport for this target
    ///
    /// On wasm32 a 401 with a redirect target navigates the browser window.
    #[cfg(any(feature = "reqwest", target_arch = "wasm32"))]
    pub fn new(base_url: Option<String>, unauthorized_redirect: Option<String>) -> Self {
        let mut client = Self::with_transport(crate::transport::default_transport());
        client.state = ClientState::new(base_url, unauthorized_redirect);
        client
    }

    /// Create a client from configuration on the default transport
    #[cfg(any(feature = "reqwest", target_arch = "wasm32"))]
    pub fn from_config(config: ClientConfig) -> Self {
        Self::from_config_with_transport(config, crate::transport::default_transport())
    }

    /// Create an unconfigured client on the given transport
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self {
            state: ClientState::default(),
            transport,
            navigator: default_navigator(),
        }
    }

    /// Create a client from configuration on the given transport
    pub fn from_config_with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let mut client = Self::with_transport(transport);
        client.state = config.into();
        client
    }

    /// Current configuration
    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Install the callback run on 401 responses
    pub fn set_navigator(&mut self, navigator: impl Navigator + 'static) -> &mut Self {
        self.navigator = Some(Arc::new(navigator));
        self
    }

    /// Set the base URL
    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> &mut Self {
        self.state.set_base_url(base_url);
        self
    }

    /// Set or clear the 401 redirect target
    pub fn set_unauthorized_redirect(&mut self, target: Option<String>) -> &mut Self {
        self.state.set_unauthorized_redirect(target);
        self
    }

    /// Restrict which methods trigger the 401 redirect
    pub fn set_unauthorized_scope(&mut self, scope: UnauthorizedScope) -> &mut Self {
        self.state.set_unauthorized_scope(scope);
        self
    }

    /// Choose whether an empty query still appends `?`
    pub fn set_empty_query(&mut self, empty_query: EmptyQuery) -> &mut Self {
        self.state.set_empty_query(empty_query);
        self
    }

    /// Use HTTP basic authentication
    pub fn set_basic_authorization(&mut self, user: &str, password: &str) -> &mut Self {
        self.state.set_basic_authorization(user, password);
        self
    }

    /// Use a bearer token
    pub fn set_bearer_authorization(&mut self, token: &str) -> &mut Self {
        self.state.set_bearer_authorization(token);
        self
    }

    /// Drop any credential
    pub fn clear_authorization(&mut self) -> &mut Self {
        self.state.clear_authorization();
        self
    }

    /// Insert or replace a header sent with every request
    pub fn add_default_header(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.state.add_default_header(key, value);
        self
    }

    /// Send a request with a method given by name
    ///
    /// The method is matched case-insensitively. Any HTTP status is returned
    /// as a [`Response`]; only transport failures are errors.
    pub async fn request(
        &self,
        url: Option<&str>,
        method: &str,
        data: Option<RequestData>,
        headers: Option<Headers>,
        options: Option<RequestOptions>,
    ) -> Result<Response> {
        let method: Method = method.parse()?;
        self.dispatch(
            method,
            RequestParams {
                url: url.map(str::to_string),
                data,
                headers: headers.unwrap_or_default(),
                options: options.unwrap_or_default(),
            },
        )
        .await
    }

    /// GET request
    pub async fn get(&self, params: RequestParams) -> Result<Response> {
        self.dispatch(Method::Get, params).await
    }

    /// POST request
    pub async fn post(&self, params: RequestParams) -> Result<Response> {
        self.dispatch(Method::Post, params).await
    }

    /// PUT request
    pub async fn put(&self, params: RequestParams) -> Result<Response> {
        self.dispatch(Method::Put, params).await
    }

    /// PATCH request
    pub async fn patch(&self, params: RequestParams) -> Result<Response> {
        self.dispatch(Method::Patch, params).await
    }

    /// DELETE request
    pub async fn delete(&self, params: RequestParams) -> Result<Response> {
        self.dispatch(Method::Delete, params).await
    }

    #[instrument(skip(self, params), fields(url = ?params.url))]
    async fn dispatch(&self, method: Method, params: RequestParams) -> Result<Response> {
        let RequestParams {
            url,
            data,
            headers,
            options,
        } = params;

        let url = compose(
            url.as_deref(),
            self.state.base_url(),
            data.as_ref(),
            method,
            self.state.empty_query(),
        )?;
        let headers = normalize(headers, data.as_ref(), &self.state)?;
        let body = if method.is_read_style() {
            None
        } else {
            encode(data)?
        };

        tracing::debug!("Sending {} {}", method, url);

        let response = self
            .transport
            .send(TransportRequest {
                method,
                url,
                headers,
                body,
                options,
            })
            .await
            .map_err(|err| {
                tracing::warn!("Transport error: {}", err);
                err
            })?;

        tracing::debug!("Received status {}", response.status());

        if response.is_unauthorized() {
            self.handle_unauthorized(method);
        }

        Ok(response)
    }

    fn handle_unauthorized(&self, method: Method) {
        let Some(target) = self.state.unauthorized_redirect() else {
            return;
        };
        if !self.state.unauthorized_scope().covers(method) {
            return;
        }
        match &self.navigator {
            Some(navigator) => {
                tracing::debug!("Unauthorized, navigating to {}", target);
                navigator.navigate(target);
            }
            None => tracing::debug!("Unauthorized, no navigator installed for {}", target),
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn default_navigator() -> Option<Arc<dyn Navigator>> {
    Some(Arc::new(crate::navigator::BrowserNavigator))
}

#[cfg(not(target_arch = "wasm32"))]
fn default_navigator() -> Option<Arc<dyn Navigator>> {
    None
}
