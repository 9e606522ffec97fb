//! Role requirements and the permission gate.
//!
//! A route's required-role field is one of three shapes: the literal
//! [`ANONYMOUS_ROLE`], a single role, or a comma-separated list meaning "any
//! of these". [`RoleRequirement::parse`] normalises all three and reports
//! anything suspicious as [`RoleIssue`]s, stray whitespace included; deciding
//! whether an issue blocks registration is left to the route builder's policy.

use std::fmt;

use crate::session::Session;

/// Role value that lets any caller through, logged in or not.
pub const ANONYMOUS_ROLE: &str = "anonymous";

/// Parsed required-role declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleRequirement {
    /// Reachable without a session.
    Anonymous,
    /// Reachable by a session holding any one of the roles.
    AnyOf(Vec<String>),
}

/// Something questionable found while parsing a role declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleIssue {
    /// The field is empty or whitespace; no session can satisfy it.
    Empty,
    /// The list contains an empty segment, e.g. `admin,,student`.
    EmptySegment,
    /// A role appears more than once.
    Duplicate(String),
    /// `anonymous` appears inside a list and is treated as an ordinary role.
    AnonymousInList,
    /// The role is not one the deployment recognises.
    UnknownRole(String),
    /// The field or one of its entries carries surrounding whitespace; the
    /// declaration as written is kept for the log.
    Padded(String),
}

impl fmt::Display for RoleIssue {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => formatter.write_str("required role is empty"),
            Self::EmptySegment => formatter.write_str("role list contains an empty entry"),
            Self::Duplicate(role) => write!(formatter, "role '{role}' is listed more than once"),
            Self::AnonymousInList => {
                write!(formatter, "'{ANONYMOUS_ROLE}' is only meaningful on its own")
            }
            Self::UnknownRole(role) => write!(formatter, "role '{role}' is not a known role"),
            Self::Padded(declared) => {
                write!(formatter, "role '{declared}' has surrounding whitespace")
            }
        }
    }
}

/// Parse result: the usable requirement plus anything worth flagging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRole {
    /// Normalised requirement.
    pub requirement: RoleRequirement,
    /// Issues found while parsing, in discovery order.
    pub issues: Vec<RoleIssue>,
}

impl RoleRequirement {
    /// Parses a raw role declaration.
    ///
    /// `known_roles` enables the unknown-role check; pass an empty slice to
    /// skip it.
    #[must_use]
    pub fn parse(raw: &str, known_roles: &[String]) -> ParsedRole {
        let trimmed = raw.trim();
        let mut issues = Vec::new();
        if !trimmed.is_empty() && trimmed != raw {
            issues.push(RoleIssue::Padded(raw.to_owned()));
        }
        if trimmed == ANONYMOUS_ROLE {
            return ParsedRole {
                requirement: Self::Anonymous,
                issues,
            };
        }

        if trimmed.is_empty() {
            issues.push(RoleIssue::Empty);
            return ParsedRole {
                requirement: Self::AnyOf(Vec::new()),
                issues,
            };
        }

        let mut roles: Vec<String> = Vec::new();
        for declared in trimmed.split(',') {
            let segment = declared.trim();
            if !segment.is_empty() && segment != declared {
                issues.push(RoleIssue::Padded(declared.to_owned()));
            }
            if segment.is_empty() {
                if !issues.contains(&RoleIssue::EmptySegment) {
                    issues.push(RoleIssue::EmptySegment);
                }
                continue;
            }
            if roles.iter().any(|role| role == segment) {
                issues.push(RoleIssue::Duplicate(segment.to_owned()));
                continue;
            }
            if segment == ANONYMOUS_ROLE {
                issues.push(RoleIssue::AnonymousInList);
            } else if !known_roles.is_empty() && !known_roles.iter().any(|known| known == segment)
            {
                issues.push(RoleIssue::UnknownRole(segment.to_owned()));
            }
            roles.push(segment.to_owned());
        }

        ParsedRole {
            requirement: Self::AnyOf(roles),
            issues,
        }
    }

    /// Returns `true` for [`RoleRequirement::Anonymous`].
    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }
}

impl fmt::Display for RoleRequirement {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => formatter.write_str(ANONYMOUS_ROLE),
            Self::AnyOf(roles) => formatter.write_str(&roles.join(",")),
        }
    }
}

/// Decides whether `session` may reach a route guarded by `requirement`.
#[must_use]
pub fn allow(session: Option<&dyn Session>, requirement: &RoleRequirement) -> bool {
    match (requirement, session) {
        (RoleRequirement::Anonymous, _) => true,
        (RoleRequirement::AnyOf(_), None) => false,
        (RoleRequirement::AnyOf(roles), Some(session)) => {
            roles.iter().any(|role| session.has_permission(role))
        }
    }
}

/// String form of [`allow`] for callers holding an unparsed role field.
#[must_use]
pub fn allow_raw(session: Option<&dyn Session>, required_role: &str) -> bool {
    allow(session, &RoleRequirement::parse(required_role, &[]).requirement)
}
