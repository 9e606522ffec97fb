//! Campus controllers and their explicit registration list.
//!
//! Each controller is a thin adapter: it reads request parameters, calls one
//! service method, and shapes the outcome. Parameter problems and business
//! rule violations become `BAD_REQUEST` responses here; only infrastructure
//! failures are returned as [`HandlerError`]s for the dispatcher to report.

mod academic;
mod auth;
mod library;
mod shop;

use std::convert::Infallible;
use std::str::FromStr;

use campus_router::{HandlerError, HandlerResult, Reply, Request, Response, RouteTableBuilder};
use serde::Serialize;

use crate::services::{ServiceError, Services};

pub use self::academic::AcademicController;
pub use self::auth::AuthController;
pub use self::library::LibraryController;
pub use self::shop::ShopController;

/// Registers every campus controller with `builder`.
///
/// This list is the complete set of controllers served by the process.
pub fn register_all(builder: &mut RouteTableBuilder, services: &Services, known_roles: &[String]) {
    let roles = known_roles.to_vec();
    builder
        .register_controller(move || Ok::<_, Infallible>(AuthController::new(roles)))
        .register_controller(|| {
            Ok::<_, Infallible>(LibraryController::new(services.catalogue.clone()))
        })
        .register_controller(|| Ok::<_, Infallible>(ShopController::new(services.store.clone())))
        .register_controller(|| {
            Ok::<_, Infallible>(AcademicController::new(services.registrar.clone()))
        });
}

/// Early exit from a controller method.
#[derive(Debug)]
enum Exit {
    /// Answer with this response.
    Respond(Response),
    /// Report an internal failure.
    Fail(HandlerError),
}

impl From<Response> for Exit {
    fn from(response: Response) -> Self {
        Self::Respond(response)
    }
}

impl From<HandlerError> for Exit {
    fn from(error: HandlerError) -> Self {
        Self::Fail(error)
    }
}

impl From<ServiceError> for Exit {
    fn from(error: ServiceError) -> Self {
        if error.is_client_error() {
            Self::Respond(Response::bad_request(error.to_string()))
        } else {
            Self::Fail(HandlerError::from_source("service call failed", error))
        }
    }
}

/// Runs a controller body that may exit early and folds the exit into a
/// handler result.
fn settle(body: impl FnOnce() -> Result<Reply, Exit>) -> HandlerResult {
    match body() {
        Ok(reply) => Ok(reply),
        Err(Exit::Respond(response)) => Ok(Reply::Response(response)),
        Err(Exit::Fail(error)) => Err(error),
    }
}

/// `SUCCESS` reply carrying `value` as data.
fn done<T: Serialize>(message: &str, value: &T) -> Result<Reply, Exit> {
    Ok(Reply::Response(Response::success_with(message, value)?))
}

/// Identity of the authenticated caller.
fn caller(request: &Request) -> Result<&str, Exit> {
    request
        .session()
        .map(|session| session.identity())
        .ok_or_else(|| Exit::Respond(Response::forbidden("authentication required")))
}

/// Required parameter parsed as `T`.
fn parsed<T: FromStr>(request: &Request, name: &str) -> Result<T, Exit> {
    let raw = request.require_param(name)?;
    raw.parse().map_err(|_| {
        Exit::Respond(Response::bad_request(format!(
            "invalid value for {name}: {raw}"
        )))
    })
}

/// Optional parameter parsed as `T`, falling back to `default` when absent.
fn parsed_or<T: FromStr>(request: &Request, name: &str, default: T) -> Result<T, Exit> {
    match request.param(name) {
        Some(raw) if !raw.trim().is_empty() => parsed(request, name),
        _ => Ok(default),
    }
}
