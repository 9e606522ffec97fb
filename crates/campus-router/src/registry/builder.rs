//! Single-threaded route registration and its report.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::sync::Arc;

use campus_config::RolePolicy;
use tracing::{error, info, warn};

use super::{Controller, REGISTRY_TARGET, RouteEntry, RouteTable};
use crate::envelope::Request;
use crate::handler::{Handler, HandlerResult};
use crate::instances::ControllerCache;
use crate::permission::{RoleIssue, RoleRequirement};

/// Route left unregistered because its role declaration was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRoute {
    /// Route uri.
    pub uri: String,
    /// Role field as declared.
    pub role: String,
    /// Issues that caused the rejection.
    pub issues: Vec<RoleIssue>,
}

/// Controller whose construction failed; none of its routes were registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedController {
    /// Controller name.
    pub name: &'static str,
    /// Constructor error, rendered.
    pub error: String,
}

/// Summary of a registration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationReport {
    /// Routes in the final table.
    pub registered: usize,
    /// Uris registered more than once; the last registration won.
    pub replaced: Vec<String>,
    /// Routes skipped under [`RolePolicy::Reject`].
    pub rejected: Vec<RejectedRoute>,
    /// Controllers that could not be constructed.
    pub failed_controllers: Vec<FailedController>,
}

impl RegistrationReport {
    /// Returns `true` when nothing was replaced, rejected, or lost.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.replaced.is_empty() && self.rejected.is_empty() && self.failed_controllers.is_empty()
    }
}

/// Single-threaded builder for a [`RouteTable`].
///
/// # Example
///
/// ```
/// use campus_router::{HandlerResult, Reply, Request, RouteTableBuilder};
/// use serde_json::json;
///
/// let mut builder = RouteTableBuilder::new();
/// builder.route("auth/ping", "anonymous", "liveness check", |_: &Request| -> HandlerResult {
///     Ok(Reply::Value(json!("pong")))
/// });
/// let (table, report) = builder.build();
/// assert!(table.has_route("auth/ping"));
/// assert!(report.is_clean());
/// ```
pub struct RouteTableBuilder {
    routes: HashMap<String, RouteEntry>,
    controllers: ControllerCache,
    policy: RolePolicy,
    known_roles: Vec<String>,
    report: RegistrationReport,
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTableBuilder {
    /// Creates a builder that warns about role issues and skips the
    /// unknown-role check.
    #[must_use]
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            controllers: ControllerCache::new(),
            policy: RolePolicy::Warn,
            known_roles: Vec::new(),
            report: RegistrationReport::default(),
        }
    }

    /// Sets how role issues are handled.
    #[must_use]
    pub const fn with_policy(mut self, policy: RolePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Enables the unknown-role check against `roles`.
    #[must_use]
    pub fn with_known_roles<I, R>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.known_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    /// Registers every route of controller `C`.
    ///
    /// The controller is built with `construct` unless an instance already
    /// exists. When construction fails the error is logged and none of the
    /// controller's routes are registered.
    pub fn register_controller<C, E>(
        &mut self,
        construct: impl FnOnce() -> Result<C, E>,
    ) -> &mut Self
    where
        C: Controller,
        E: fmt::Display,
    {
        let name = C::name();
        let instance = match self.controllers.get_or_try_create(construct) {
            Ok(instance) => instance,
            Err(source) => {
                error!(
                    target: REGISTRY_TARGET,
                    controller = name,
                    error = %source,
                    "controller construction failed; its routes are not registered"
                );
                self.report.failed_controllers.push(FailedController {
                    name,
                    error: source.to_string(),
                });
                return self;
            }
        };

        let descriptors = C::routes();
        let count = descriptors.len();
        for descriptor in descriptors {
            let controller = Arc::clone(&instance);
            let method = descriptor.handler;
            let handler = move |request: &Request| -> HandlerResult { method(&controller, request) };
            self.insert(
                name,
                descriptor.uri,
                descriptor.role,
                descriptor.description,
                Arc::new(handler),
            );
        }

        info!(
            target: REGISTRY_TARGET,
            controller = name,
            routes = count,
            "controller registered"
        );
        self
    }

    /// Registers a free-standing handler.
    pub fn route(
        &mut self,
        uri: impl Into<String>,
        role: &str,
        description: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> &mut Self {
        self.insert("<route>", uri, role, description, Arc::new(handler));
        self
    }

    fn insert(
        &mut self,
        owner: &'static str,
        uri: impl Into<String>,
        role: &str,
        description: impl Into<String>,
        handler: Arc<dyn Handler>,
    ) {
        let uri = uri.into();
        let parsed = RoleRequirement::parse(role, &self.known_roles);
        if !parsed.issues.is_empty() && !self.accept_role(&uri, role, parsed.issues) {
            return;
        }

        let entry = RouteEntry::new(owner, handler, parsed.requirement, role, description);
        match self.routes.entry(uri) {
            Entry::Occupied(mut slot) => {
                warn!(
                    target: REGISTRY_TARGET,
                    uri = slot.key().as_str(),
                    previous_owner = slot.get().owner(),
                    owner,
                    "route registered twice; the later registration replaces the earlier one"
                );
                self.report.replaced.push(slot.key().clone());
                slot.insert(entry);
            }
            Entry::Vacant(slot) => {
                slot.insert(entry);
            }
        }
    }

    fn accept_role(&mut self, uri: &str, role: &str, issues: Vec<RoleIssue>) -> bool {
        match self.policy {
            RolePolicy::Warn => {
                for issue in &issues {
                    warn!(
                        target: REGISTRY_TARGET,
                        uri,
                        role,
                        issue = %issue,
                        "questionable role declaration"
                    );
                }
                true
            }
            RolePolicy::Reject => {
                for issue in &issues {
                    error!(
                        target: REGISTRY_TARGET,
                        uri,
                        role,
                        issue = %issue,
                        "route rejected: invalid role declaration"
                    );
                }
                self.report.rejected.push(RejectedRoute {
                    uri: uri.to_owned(),
                    role: role.to_owned(),
                    issues,
                });
                false
            }
        }
    }

    /// Finishes registration.
    #[must_use]
    pub fn build(self) -> (RouteTable, RegistrationReport) {
        let mut report = self.report;
        report.registered = self.routes.len();
        (RouteTable::new(self.routes, self.controllers), report)
    }
}

impl fmt::Debug for RouteTableBuilder {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("RouteTableBuilder")
            .field("routes", &self.routes.len())
            .field("controllers", &self.controllers)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
