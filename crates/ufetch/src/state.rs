//! Client configuration state

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::method::Method;

/// Which responses trigger the unauthorized redirect
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnauthorizedScope {
    /// A 401 to any method navigates
    #[default]
    AllMethods,
    /// Only a 401 to GET or HEAD navigates
    ReadOnly,
}

impl UnauthorizedScope {
    /// Whether a 401 for `method` falls in this scope
    pub fn covers(&self, method: Method) -> bool {
        match self {
            UnauthorizedScope::AllMethods => true,
            UnauthorizedScope::ReadOnly => method.is_read_style(),
        }
    }
}

/// What to do with a read-style URL when the data yields no query pairs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyQuery {
    /// Leave the URL untouched
    #[default]
    Omit,
    /// Append a bare `?` when the URL has no query yet
    TrailingMark,
}

/// Shared configuration read by every request
///
/// At most one credential is active: setting basic auth clears bearer auth
/// and the other way around.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientState {
    base_url: Option<String>,
    basic_auth: Option<String>,
    bearer_auth: Option<String>,
    default_headers: Vec<(String, String)>,
    unauthorized_redirect: Option<String>,
    unauthorized_scope: UnauthorizedScope,
    empty_query: EmptyQuery,
}

impl ClientState {
    /// Create a state with an optional base URL and unauthorized redirect target
    pub fn new(base_url: Option<String>, unauthorized_redirect: Option<String>) -> Self {
        Self {
            base_url: base_url.filter(|url| !url.is_empty()),
            unauthorized_redirect: unauthorized_redirect.filter(|target| !target.is_empty()),
            ..Default::default()
        }
    }

    /// Set the base URL used when a request has no explicit URL
    pub fn set_base_url(&mut self, base_url: impl Into<String>) -> &mut Self {
        let base_url = base_url.into();
        self.base_url = (!base_url.is_empty()).then_some(base_url);
        self
    }

    /// Set or clear the target navigated to on a 401 response
    pub fn set_unauthorized_redirect(&mut self, target: Option<String>) -> &mut Self {
        self.unauthorized_redirect = target.filter(|target| !target.is_empty());
        self
    }

    /// Restrict which methods trigger the unauthorized redirect
    pub fn set_unauthorized_scope(&mut self, scope: UnauthorizedScope) -> &mut Self {
        self.unauthorized_scope = scope;
        self
    }

    /// Choose whether an empty query still appends `?`
    pub fn set_empty_query(&mut self, empty_query: EmptyQuery) -> &mut Self {
        self.empty_query = empty_query;
        self
    }

    /// Use HTTP basic authentication
    ///
    /// Both parts must be non-empty, otherwise basic auth is cleared and any
    /// bearer token stays as it was.
    pub fn set_basic_authorization(&mut self, user: &str, password: &str) -> &mut Self {
        if !user.is_empty() && !password.is_empty() {
            let encoded = base64::engine::general_purpose::STANDARD
                .encode(format!("{}:{}", user, password));
            self.basic_auth = Some(format!("Basic {}", encoded));
            self.bearer_auth = None;
        } else {
            self.basic_auth = None;
        }
        self
    }

    /// Use a bearer token, or clear it when `token` is empty
    pub fn set_bearer_authorization(&mut self, token: &str) -> &mut Self {
        if !token.is_empty() {
            self.bearer_auth = Some(format!("Bearer {}", token));
            self.basic_auth = None;
        } else {
            self.bearer_auth = None;
        }
        self
    }

    /// Drop any credential
    pub fn clear_authorization(&mut self) -> &mut Self {
        self.basic_auth = None;
        self.bearer_auth = None;
        self
    }

    /// Insert or replace a header sent with every request
    ///
    /// Keys compare case-insensitively; a replaced header keeps its position.
    pub fn add_default_header(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self
            .default_headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&key))
        {
            Some(entry) => *entry = (key, value),
            None => self.default_headers.push((key, value)),
        }
        self
    }

    /// Base URL, if any
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Active `Authorization` value; basic wins over bearer
    pub fn authorization(&self) -> Option<&str> {
        self.basic_auth.as_deref().or(self.bearer_auth.as_deref())
    }

    /// Headers added to every request, in insertion order
    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    /// Unauthorized redirect target, if any
    pub fn unauthorized_redirect(&self) -> Option<&str> {
        self.unauthorized_redirect.as_deref()
    }

    /// Which methods trigger the unauthorized redirect
    pub fn unauthorized_scope(&self) -> UnauthorizedScope {
        self.unauthorized_scope
    }

    /// Empty query behaviour
    pub fn empty_query(&self) -> EmptyQuery {
        self.empty_query
    }
}
