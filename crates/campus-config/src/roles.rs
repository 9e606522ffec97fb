//! Registration-time policy for route role declarations.
//!
//! Route descriptors carry a free-form required-role field: a single role, the
//! literal `anonymous`, or a comma-separated list. The policy decides what the
//! route builder does when a declaration looks malformed or names a role the
//! deployment does not know about.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Action taken when a route declares a questionable required role.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RolePolicy {
    /// Log each issue and register the route anyway.
    #[default]
    Warn,
    /// Log each issue and leave the route unregistered.
    Reject,
}

/// Errors encountered while parsing a [`RolePolicy`] from text.
pub type RolePolicyParseError = strum::ParseError;

/// Splits a comma-separated role list into trimmed, non-empty role names.
///
/// Order is preserved and duplicates are dropped.
#[must_use]
pub fn split_role_list(raw: &str) -> Vec<String> {
    let mut roles: Vec<String> = Vec::new();
    for role in raw.split(',').map(str::trim).filter(|role| !role.is_empty()) {
        if !roles.iter().any(|known| known == role) {
            roles.push(role.to_owned());
        }
    }
    roles
}
