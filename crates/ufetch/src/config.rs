//! Deserializable client configuration

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::state::{ClientState, EmptyQuery, UnauthorizedScope};

/// Basic auth credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    /// User name
    pub user: String,
    /// Password
    pub password: String,
}

/// Client settings loadable from any serde format
///
/// When both `bearer_token` and `basic_auth` are given, basic auth is the
/// active credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL for requests without an explicit URL
    pub base_url: Option<String>,
    /// Where to navigate on a 401 response
    pub unauthorized_redirect: Option<String>,
    /// Headers sent with every request
    pub default_headers: BTreeMap<String, String>,
    /// Bearer token
    pub bearer_token: Option<String>,
    /// Basic auth credentials
    pub basic_auth: Option<BasicAuth>,
    /// Which methods trigger the unauthorized redirect
    pub unauthorized_scope: UnauthorizedScope,
    /// Whether an empty read-style query appends `?`
    pub empty_query: EmptyQuery,
}

impl From<ClientConfig> for ClientState {
    fn from(config: ClientConfig) -> Self {
        let mut state = ClientState::new(config.base_url, config.unauthorized_redirect);
        state
            .set_unauthorized_scope(config.unauthorized_scope)
            .set_empty_query(config.empty_query);

        for (key, value) in config.default_headers {
            state.add_default_header(key, value);
        }
        if let Some(token) = &config.bearer_token {
            state.set_bearer_authorization(token);
        }
        if let Some(basic) = &config.basic_auth {
            state.set_basic_authorization(&basic.user, &basic.password);
        }

        state
    }
}
