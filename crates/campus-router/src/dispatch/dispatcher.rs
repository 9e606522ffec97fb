//! Request dispatch: lookup, permission gate, handler call and timing.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use super::{DISPATCH_TARGET, DispatchError};
use crate::envelope::{Request, Response};
use crate::handler::Reply;
use crate::permission::allow;
use crate::registry::{RouteEntry, RouteTable};

/// Message attached to `SUCCESS` responses wrapping a bare handler value.
const SUCCESS_MESSAGE: &str = "ok";

/// Tunables for the dispatcher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Handlers running longer than this are logged. The handler is never
    /// interrupted; the caller keeps waiting for it.
    pub slow_handler_threshold: Option<Duration>,
}

/// Routes requests through the published table.
///
/// The dispatcher holds no mutable state, so one instance can serve any
/// number of threads at once.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    table: Arc<RouteTable>,
    options: DispatchOptions,
}

impl Dispatcher {
    /// Creates a dispatcher over `table` with default options.
    #[must_use]
    pub fn new(table: RouteTable) -> Self {
        Self::with_options(table, DispatchOptions::default())
    }

    /// Creates a dispatcher with explicit options.
    #[must_use]
    pub fn with_options(table: RouteTable, options: DispatchOptions) -> Self {
        Self {
            table: Arc::new(table),
            options,
        }
    }

    /// Route table in use.
    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Options in use.
    #[must_use]
    pub const fn options(&self) -> DispatchOptions {
        self.options
    }

    /// Whether `uri` is registered.
    #[must_use]
    pub fn has_route(&self, uri: &str) -> bool {
        self.table.has_route(uri)
    }

    /// Required-role field of `uri` as declared.
    #[must_use]
    pub fn required_role(&self, uri: &str) -> Option<&str> {
        self.table.required_role(uri)
    }

    /// Resolves `request` to a response carrying the request's id.
    ///
    /// Never panics on behalf of a handler and never returns an error: every
    /// failure is expressed as a response status.
    #[must_use]
    pub fn route(&self, request: &Request) -> Response {
        let response = match self.dispatch(request) {
            Ok(Reply::Response(response)) => response,
            Ok(Reply::Value(value)) => Response::success(SUCCESS_MESSAGE).with_data(value),
            Err(failure) => {
                log_failure(request, &failure);
                failure.to_response()
            }
        };
        response.with_id(request.id().clone())
    }

    fn dispatch(&self, request: &Request) -> Result<Reply, DispatchError> {
        let uri = request.uri();
        let entry = self
            .table
            .get(uri)
            .ok_or_else(|| DispatchError::route_not_found(uri))?;

        if !allow(request.session(), entry.requirement()) {
            return Err(DispatchError::permission_denied(
                uri,
                entry.requirement().to_string(),
            ));
        }

        debug!(
            target: DISPATCH_TARGET,
            uri,
            id = %request.id(),
            owner = entry.owner(),
            "dispatching request"
        );
        self.invoke(entry, request)
    }

    fn invoke(&self, entry: &RouteEntry, request: &Request) -> Result<Reply, DispatchError> {
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.handler().call(request)));
        self.observe_elapsed(request, started.elapsed());

        match outcome {
            Ok(Ok(reply)) => Ok(reply),
            Ok(Err(source)) => Err(DispatchError::handler_failed(request.uri(), source)),
            Err(payload) => Err(DispatchError::handler_panicked(
                request.uri(),
                panic_message(&*payload),
            )),
        }
    }

    fn observe_elapsed(&self, request: &Request, elapsed: Duration) {
        let Some(threshold) = self.options.slow_handler_threshold else {
            return;
        };
        if elapsed > threshold {
            warn!(
                target: DISPATCH_TARGET,
                uri = request.uri(),
                id = %request.id(),
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                threshold_ms = u64::try_from(threshold.as_millis()).unwrap_or(u64::MAX),
                "slow handler"
            );
        }
    }
}

fn log_failure(request: &Request, failure: &DispatchError) {
    let identity = request.session().map(|session| session.identity());
    match failure {
        DispatchError::RouteNotFound { .. } | DispatchError::PermissionDenied { .. } => {
            warn!(
                target: DISPATCH_TARGET,
                uri = request.uri(),
                id = %request.id(),
                identity,
                error = %failure,
                "request rejected"
            );
        }
        DispatchError::HandlerFailed { source, .. } => {
            error!(
                target: DISPATCH_TARGET,
                uri = request.uri(),
                id = %request.id(),
                identity,
                error = %source.detailed(),
                cause = ?source,
                "handler failed"
            );
        }
        DispatchError::HandlerPanicked { message, .. } => {
            error!(
                target: DISPATCH_TARGET,
                uri = request.uri(),
                id = %request.id(),
                identity,
                panic = message.as_str(),
                "handler panicked"
            );
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}
