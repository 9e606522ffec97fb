use crate::logging::LogFormat;
use crate::roles::RolePolicy;

/// Default log filter expression used by the binaries.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Roles recognised by a stock deployment, comma-separated.
pub const DEFAULT_KNOWN_ROLES: &str = "admin,student,teacher";

/// Number of dispatch worker threads started by default.
pub const DEFAULT_DISPATCH_WORKERS: usize = 4;

/// Default log filter expression used by the binaries.
#[must_use]
pub const fn default_log_filter() -> &'static str {
    DEFAULT_LOG_FILTER
}

/// Owned log filter value used where allocation is required (e.g. serde).
#[must_use]
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the binaries.
#[must_use]
pub const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default handling of questionable role declarations.
#[must_use]
pub const fn default_role_policy() -> RolePolicy {
    RolePolicy::Warn
}

/// Owned known-role list used where allocation is required (e.g. serde).
#[must_use]
pub fn default_known_roles_string() -> String {
    DEFAULT_KNOWN_ROLES.to_owned()
}

/// Slow handler warnings are disabled unless configured.
#[must_use]
pub const fn default_slow_handler_warn_ms() -> u64 {
    0
}

/// Default size of the dispatch worker pool.
#[must_use]
pub const fn default_dispatch_workers() -> usize {
    DEFAULT_DISPATCH_WORKERS
}
