//! Request routing for the campus management service.
//!
//! A request names an operation by uri (for example
//! `library/student/borrow`), carries string parameters, an optional
//! authenticated session, and a correlation id. This crate resolves the uri
//! to a registered handler, checks the caller's roles against the route's
//! requirement, invokes the handler, and always answers with a
//! [`Response`] carrying the request's id.
//!
//! The pieces, in the order a request meets them:
//!
//! - [`envelope`]: the [`Request`] and [`Response`] types.
//! - [`registry`]: controllers declare their routes through [`Controller`];
//!   a [`RouteTableBuilder`] binds them to singleton instances held in a
//!   [`ControllerCache`] and produces an immutable [`RouteTable`].
//! - [`permission`]: [`allow`] decides whether a [`Session`] satisfies a
//!   route's [`RoleRequirement`].
//! - [`dispatch`]: the [`Dispatcher`] turns every outcome, including handler
//!   failures and panics, into a [`Response`].
//!
//! Registration happens once, single-threaded, at start-up. The finished
//! table is read-only, so a published [`Dispatcher`] serves any number of
//! threads without locking.

pub mod dispatch;
pub mod envelope;
mod handler;
mod instances;
pub mod permission;
mod publish;
pub mod registry;
mod session;

pub use dispatch::{DispatchError, DispatchOptions, Dispatcher};
pub use envelope::{Request, RequestId, Response, Status};
pub use handler::{Handler, HandlerError, HandlerResult, Reply};
pub use instances::ControllerCache;
pub use permission::{ANONYMOUS_ROLE, ParsedRole, RoleIssue, RoleRequirement, allow, allow_raw};
pub use publish::{AlreadyInstalled, install, installed};
pub use registry::{
    Controller, FailedController, RegistrationReport, RejectedRoute, RouteDescriptor, RouteEntry,
    RouteTable, RouteTableBuilder,
};
pub use session::{RoleSession, Session};

#[cfg(test)]
mod tests;
