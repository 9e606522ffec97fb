//! Authenticated-session contract consumed by the permission gate.
//!
//! Authentication happens in the transport's login subsystem; the router only
//! asks whether a session holds a role. [`RoleSession`] is a plain role-set
//! implementation for transports that resolve roles up front and for tests.

use std::collections::BTreeSet;
use std::fmt;

/// Identity attached to a request after login.
pub trait Session: Send + Sync + fmt::Debug {
    /// Stable identifier of the logged-in principal.
    fn identity(&self) -> &str;

    /// Whether the principal holds `role`.
    fn has_permission(&self, role: &str) -> bool;
}

/// Session backed by a fixed set of role names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleSession {
    identity: String,
    roles: BTreeSet<String>,
}

impl RoleSession {
    /// Creates a session for `identity` holding `roles`.
    #[must_use]
    pub fn new<I, R>(identity: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            identity: identity.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Roles held by the session.
    #[must_use]
    pub const fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }
}

impl Session for RoleSession {
    fn identity(&self) -> &str {
        &self.identity
    }

    fn has_permission(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_is_exact() {
        let session = RoleSession::new("bob", ["teacher"]);
        assert!(session.has_permission("teacher"));
        assert!(!session.has_permission("Teacher"));
        assert!(!session.has_permission("admin"));
        assert_eq!(session.identity(), "bob");
    }
}
