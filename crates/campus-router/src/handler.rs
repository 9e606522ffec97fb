//! Handler contract between the dispatcher and controllers.
//!
//! A handler either returns a ready [`Response`] (which the dispatcher only
//! re-stamps with the request id) or a bare JSON value (which becomes the
//! payload of a `SUCCESS` response). Errors bubble up as [`HandlerError`] and
//! are turned into `INTERNAL_ERROR` at the dispatch boundary.

use std::error::Error as StdError;

use serde_json::Value;
use thiserror::Error;

use crate::envelope::{Request, Response};

/// What a handler produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A complete response, passed through unchanged apart from the id.
    Response(Response),
    /// A bare value wrapped into a `SUCCESS` response.
    Value(Value),
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

impl From<Value> for Reply {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// Failure raised by a handler that it did not turn into a response itself.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl HandlerError {
    /// Creates an error with a description only.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an error wrapping an underlying cause.
    #[must_use]
    pub fn from_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Description suitable for the client; never includes the source chain.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Full description including every source in the chain, for logs.
    #[must_use]
    pub fn detailed(&self) -> String {
        let mut detail = self.message.clone();
        let mut next = StdError::source(self);
        while let Some(cause) = next {
            detail.push_str(": ");
            detail.push_str(&cause.to_string());
            next = cause.source();
        }
        detail
    }
}

/// Return type of every handler.
pub type HandlerResult = Result<Reply, HandlerError>;

/// Operation bound to a route.
pub trait Handler: Send + Sync {
    /// Runs the operation for `request`.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when the operation fails in a way the handler
    /// did not express as a response.
    fn call(&self, request: &Request) -> HandlerResult;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> HandlerResult + Send + Sync,
{
    fn call(&self, request: &Request) -> HandlerResult {
        self(request)
    }
}
