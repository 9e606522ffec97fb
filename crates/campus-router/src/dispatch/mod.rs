//! Request dispatch: route lookup, permission gate, invocation, and
//! normalisation of every outcome into a [`Response`](crate::Response).
//!
//! The dispatcher is the single boundary where failures become responses.
//! Nothing above it needs to handle an error from routing or from a handler:
//!
//! | outcome                         | status           |
//! |---------------------------------|------------------|
//! | uri not registered              | `NOT_FOUND`      |
//! | session missing or lacks role   | `FORBIDDEN`      |
//! | handler error or panic          | `INTERNAL_ERROR` |
//! | handler returned a `Response`   | passed through   |
//! | handler returned a value        | `SUCCESS`        |
//!
//! Every response carries the id of the request that produced it.

mod dispatcher;
mod errors;

pub use self::dispatcher::{DispatchOptions, Dispatcher};
pub use self::errors::DispatchError;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
