//! Session routes. Login itself belongs to the transport; these routes only
//! report on the session it attached.

use campus_router::{Controller, HandlerResult, Request, Response, RouteDescriptor};
use serde::Serialize;

use super::{caller, done, settle};

#[derive(Debug, Serialize)]
struct Identity<'a> {
    identity: &'a str,
    roles: Vec<&'a str>,
}

/// Serves the `auth/*` routes.
#[derive(Debug)]
pub struct AuthController {
    known_roles: Vec<String>,
}

impl AuthController {
    /// Creates the controller; `whoami` reports which of `known_roles` the
    /// caller holds.
    #[must_use]
    pub const fn new(known_roles: Vec<String>) -> Self {
        Self { known_roles }
    }

    fn logout(&self, request: &Request) -> HandlerResult {
        let message = request.session().map_or_else(
            || "no active session".to_owned(),
            |session| format!("logged out {}", session.identity()),
        );
        Ok(Response::success(message).into())
    }

    fn whoami(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let identity = caller(request)?;
            let roles = request.session().map_or_else(Vec::new, |session| {
                self.known_roles
                    .iter()
                    .map(String::as_str)
                    .filter(|role| session.has_permission(role))
                    .collect()
            });
            done("session active", &Identity { identity, roles })
        })
    }
}

impl Controller for AuthController {
    fn routes() -> Vec<RouteDescriptor<Self>> {
        vec![
            RouteDescriptor::new(
                "auth/logout",
                "anonymous",
                "acknowledge logout of the current session",
                Self::logout,
            ),
            RouteDescriptor::new(
                "auth/whoami",
                "student,teacher,admin",
                "report the caller's identity and roles",
                Self::whoami,
            ),
        ]
    }

    fn name() -> &'static str {
        "auth"
    }
}
