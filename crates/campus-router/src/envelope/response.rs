//! Outbound response envelope and its status codes.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::RequestId;
use crate::handler::HandlerError;

/// Outcome class of a dispatched request.
///
/// The router itself only ever produces `NotFound`, `Forbidden`, and
/// `InternalError`; `Success` and `BadRequest` come from controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// The handler completed normally.
    Success,
    /// The controller rejected the request parameters.
    BadRequest,
    /// The session lacks the role the route requires.
    Forbidden,
    /// No route is registered for the uri.
    NotFound,
    /// The handler failed or panicked.
    InternalError,
}

impl Status {
    /// Canonical wire spelling of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::BadRequest => "BAD_REQUEST",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Returns `true` for [`Status::Success`].
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Uniform response envelope returned for every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    status: Status,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<RequestId>,
}

impl Response {
    /// Creates a response with an explicit status and no payload.
    #[must_use]
    pub fn new(status: Status, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
            id: None,
        }
    }

    /// Successful outcome.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Status::Success, message)
    }

    /// Successful outcome carrying a serialised payload.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError`] when `payload` cannot be converted to JSON.
    pub fn success_with<T: Serialize>(
        message: impl Into<String>,
        payload: &T,
    ) -> Result<Self, HandlerError> {
        let data = serde_json::to_value(payload)
            .map_err(|error| HandlerError::from_source("failed to serialise payload", error))?;
        Ok(Self::success(message).with_data(data))
    }

    /// Controller-side validation failure.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(Status::BadRequest, message)
    }

    /// Permission gate refusal.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(Status::Forbidden, message)
    }

    /// Unknown route.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Status::NotFound, message)
    }

    /// Handler failure with a sanitised message.
    #[must_use]
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(Status::InternalError, message)
    }

    /// Attaches a payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Stamps the correlation id, replacing any previous one.
    #[must_use]
    pub fn with_id(mut self, id: RequestId) -> Self {
        self.id = Some(id);
        self
    }

    /// Outcome class.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Payload, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Correlation id; always present on responses returned by the dispatcher.
    #[must_use]
    pub const fn id(&self) -> Option<&RequestId> {
        self.id.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::success(Response::success("ok"), Status::Success)]
    #[case::bad_request(Response::bad_request("bad"), Status::BadRequest)]
    #[case::forbidden(Response::forbidden("no"), Status::Forbidden)]
    #[case::not_found(Response::not_found("gone"), Status::NotFound)]
    #[case::internal(Response::internal_error("boom"), Status::InternalError)]
    fn named_constructors_set_status(#[case] response: Response, #[case] expected: Status) {
        assert_eq!(response.status(), expected);
        assert!(response.data().is_none());
        assert!(response.id().is_none());
    }

    #[test]
    fn with_id_replaces_previous_id() {
        let response = Response::success("ok")
            .with_id(RequestId::new("first"))
            .with_id(RequestId::new("second"));
        assert_eq!(response.id().map(RequestId::as_str), Some("second"));
    }

    #[test]
    fn success_with_serialises_payload() {
        let response = Response::success_with("found", &vec!["a", "b"]).expect("serialise");
        assert_eq!(response.data(), Some(&json!(["a", "b"])));
    }

    #[test]
    fn serialises_status_in_wire_spelling() {
        let response = Response::forbidden("denied").with_id(RequestId::new("r2"));
        let value = serde_json::to_value(&response).expect("serialise");
        assert_eq!(
            value,
            json!({"status": "FORBIDDEN", "message": "denied", "id": "r2"})
        );
    }

    #[test]
    fn status_display_matches_serde() {
        for status in [
            Status::Success,
            Status::BadRequest,
            Status::Forbidden,
            Status::NotFound,
            Status::InternalError,
        ] {
            let serialised = serde_json::to_value(status).expect("serialise");
            assert_eq!(serialised, json!(status.to_string()));
        }
    }
}
