//! Failure kinds produced at the dispatch boundary.

use thiserror::Error;

use crate::envelope::{Response, Status};
use crate::handler::HandlerError;

/// Reasons a request did not reach a normal handler outcome.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No route is registered for the uri.
    #[error("route does not exist: {uri}")]
    RouteNotFound {
        /// Requested uri.
        uri: String,
    },

    /// The session is absent or holds none of the required roles.
    #[error("permission denied: {uri} requires role '{required}'")]
    PermissionDenied {
        /// Requested uri.
        uri: String,
        /// Required-role field of the route.
        required: String,
    },

    /// The handler returned an error.
    #[error("internal error: {message}")]
    HandlerFailed {
        /// Requested uri.
        uri: String,
        /// Client-safe description of the failure.
        message: String,
        /// Underlying handler error, logged server-side only.
        #[source]
        source: HandlerError,
    },

    /// The handler panicked.
    #[error("internal error: handler panicked: {message}")]
    HandlerPanicked {
        /// Requested uri.
        uri: String,
        /// Panic payload, when it was a string.
        message: String,
    },
}

impl DispatchError {
    /// Creates a route-not-found error.
    pub fn route_not_found(uri: impl Into<String>) -> Self {
        Self::RouteNotFound { uri: uri.into() }
    }

    /// Creates a permission-denied error.
    pub fn permission_denied(uri: impl Into<String>, required: impl Into<String>) -> Self {
        Self::PermissionDenied {
            uri: uri.into(),
            required: required.into(),
        }
    }

    /// Wraps a handler error.
    pub fn handler_failed(uri: impl Into<String>, source: HandlerError) -> Self {
        Self::HandlerFailed {
            uri: uri.into(),
            message: source.message().to_owned(),
            source,
        }
    }

    /// Records a handler panic.
    pub fn handler_panicked(uri: impl Into<String>, message: impl Into<String>) -> Self {
        Self::HandlerPanicked {
            uri: uri.into(),
            message: message.into(),
        }
    }

    /// Uri of the request that failed.
    #[must_use]
    pub fn uri(&self) -> &str {
        match self {
            Self::RouteNotFound { uri }
            | Self::PermissionDenied { uri, .. }
            | Self::HandlerFailed { uri, .. }
            | Self::HandlerPanicked { uri, .. } => uri,
        }
    }

    /// Response status this failure maps to.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::RouteNotFound { .. } => Status::NotFound,
            Self::PermissionDenied { .. } => Status::Forbidden,
            Self::HandlerFailed { .. } | Self::HandlerPanicked { .. } => Status::InternalError,
        }
    }

    /// Converts the failure into a client-facing response (without an id).
    #[must_use]
    pub fn to_response(&self) -> Response {
        Response::new(self.status(), self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::not_found(DispatchError::route_not_found("a/b"), Status::NotFound, "route does not exist: a/b")]
    #[case::forbidden(
        DispatchError::permission_denied("a/b", "admin"),
        Status::Forbidden,
        "permission denied: a/b requires role 'admin'"
    )]
    #[case::failed(
        DispatchError::handler_failed("a/b", HandlerError::new("disk full")),
        Status::InternalError,
        "internal error: disk full"
    )]
    #[case::panicked(
        DispatchError::handler_panicked("a/b", "index out of bounds"),
        Status::InternalError,
        "internal error: handler panicked: index out of bounds"
    )]
    fn maps_to_response(
        #[case] error: DispatchError,
        #[case] status: Status,
        #[case] message: &str,
    ) {
        let response = error.to_response();
        assert_eq!(response.status(), status);
        assert_eq!(response.message(), message);
        assert_eq!(error.uri(), "a/b");
    }
}
