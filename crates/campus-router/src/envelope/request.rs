//! Inbound request envelope: uri, correlation id, parameters and session.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::Response;
use crate::session::Session;

/// Opaque correlation token copied from a request onto its response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Wraps a transport-provided token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for RequestId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Inbound request delivered by the transport.
///
/// The builder methods consume and return the request so the transport can
/// assemble it in one expression; once handed to the dispatcher it is only
/// ever read.
#[derive(Debug, Clone)]
pub struct Request {
    uri: String,
    params: BTreeMap<String, String>,
    session: Option<Arc<dyn Session>>,
    id: RequestId,
}

impl Request {
    /// Creates a request without parameters or session.
    #[must_use]
    pub fn new(uri: impl Into<String>, id: impl Into<RequestId>) -> Self {
        Self {
            uri: uri.into(),
            params: BTreeMap::new(),
            session: None,
            id: id.into(),
        }
    }

    /// Adds or replaces a single parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds or replaces several parameters.
    #[must_use]
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.params
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Attaches the authenticated session.
    #[must_use]
    pub fn with_session(mut self, session: Arc<dyn Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Route uri, for example `library/student/borrow`.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// All request parameters.
    #[must_use]
    pub const fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    /// Looks up one parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// Looks up a parameter that must be present and non-blank.
    ///
    /// # Errors
    ///
    /// Returns a `BAD_REQUEST` response naming the parameter, ready to be
    /// handed back by a controller.
    pub fn require_param(&self, name: &str) -> Result<&str, Response> {
        match self.param(name).map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(Response::bad_request(format!(
                "missing required parameter: {name}"
            ))),
        }
    }

    /// Authenticated session, if the caller has logged in.
    #[must_use]
    pub fn session(&self) -> Option<&dyn Session> {
        self.session.as_deref()
    }

    /// Correlation id assigned by the transport.
    #[must_use]
    pub const fn id(&self) -> &RequestId {
        &self.id
    }
}
