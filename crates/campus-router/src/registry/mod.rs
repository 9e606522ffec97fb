//! Route registry: the immutable `uri -> RouteEntry` table.
//!
//! Routes are declared in code. A controller lists its operations through
//! [`Controller::routes`], each a [`RouteDescriptor`] naming the uri, the
//! required role, a description, and the method to call. The
//! [`RouteTableBuilder`] constructs every controller once through the
//! [`ControllerCache`](crate::instances::ControllerCache), binds each
//! descriptor to that instance, and produces a [`RouteTable`] that is never
//! mutated again.

mod builder;
mod table;

use std::any::type_name;
use std::fmt;
use std::sync::Arc;

pub use self::builder::{FailedController, RegistrationReport, RejectedRoute, RouteTableBuilder};
pub use self::table::RouteTable;

use crate::envelope::Request;
use crate::handler::{Handler, HandlerResult};
use crate::permission::RoleRequirement;

/// Tracing target for registration events.
pub(crate) const REGISTRY_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::registry");

/// Compile-time route declaration for a controller method.
pub struct RouteDescriptor<C> {
    /// Route uri, for example `library/admin/book/add`.
    pub uri: &'static str,
    /// Required-role field: `anonymous`, one role, or a comma-separated list.
    pub role: &'static str,
    /// Diagnostic description.
    pub description: &'static str,
    /// Controller method serving the route.
    pub handler: fn(&C, &Request) -> HandlerResult,
}

impl<C> RouteDescriptor<C> {
    /// Declares a route.
    #[must_use]
    pub const fn new(
        uri: &'static str,
        role: &'static str,
        description: &'static str,
        handler: fn(&C, &Request) -> HandlerResult,
    ) -> Self {
        Self {
            uri,
            role,
            description,
            handler,
        }
    }
}

impl<C> fmt::Debug for RouteDescriptor<C> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RouteDescriptor")
            .field("uri", &self.uri)
            .field("role", &self.role)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A type owning one or more route handlers.
pub trait Controller: Send + Sync + Sized + 'static {
    /// Routes served by this controller.
    fn routes() -> Vec<RouteDescriptor<Self>>;

    /// Name used in logs; defaults to the type name.
    fn name() -> &'static str {
        type_name::<Self>()
    }
}

/// A registered route.
#[derive(Clone)]
pub struct RouteEntry {
    owner: &'static str,
    handler: Arc<dyn Handler>,
    requirement: RoleRequirement,
    required_role: String,
    description: String,
}

impl RouteEntry {
    pub(crate) fn new(
        owner: &'static str,
        handler: Arc<dyn Handler>,
        requirement: RoleRequirement,
        required_role: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            owner,
            handler,
            requirement,
            required_role: required_role.into(),
            description: description.into(),
        }
    }

    /// Name of the controller (or registrant) that owns the handler.
    #[must_use]
    pub const fn owner(&self) -> &'static str {
        self.owner
    }

    /// Handler bound to the route.
    #[must_use]
    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }

    /// Parsed role requirement used by the permission gate.
    #[must_use]
    pub const fn requirement(&self) -> &RoleRequirement {
        &self.requirement
    }

    /// Required-role field exactly as declared.
    #[must_use]
    pub fn required_role(&self) -> &str {
        &self.required_role
    }

    /// Diagnostic description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RouteEntry")
            .field("owner", &self.owner)
            .field("required_role", &self.required_role)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
