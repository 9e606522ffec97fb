//! Shared configuration for the campus dispatch server.
//!
//! Values are layered by [`ortho_config`]: built-in defaults, then an optional
//! TOML file (`--config-path` or `CAMPUS_CONFIG_PATH`), then `CAMPUS_*`
//! environment variables, then command-line flags. The resolved [`Config`]
//! drives telemetry, role validation during route registration, and the
//! dispatch worker pool.

mod defaults;
mod logging;
mod roles;

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

pub use self::defaults::{
    DEFAULT_DISPATCH_WORKERS, DEFAULT_KNOWN_ROLES, DEFAULT_LOG_FILTER, default_dispatch_workers,
    default_known_roles_string, default_log_filter, default_log_filter_string,
    default_log_format, default_role_policy, default_slow_handler_warn_ms,
};
pub use self::logging::{LogFormat, LogFormatParseError};
pub use self::roles::{RolePolicy, RolePolicyParseError, split_role_list};

/// Resolved server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "CAMPUS")]
pub struct Config {
    /// `tracing` filter expression, for example `info` or `campusd=debug`.
    #[ortho_config(default = default_log_filter_string())]
    pub log_filter: String,
    /// Output format of the log stream.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
    /// What route registration does with questionable role declarations.
    #[ortho_config(default = default_role_policy())]
    pub role_policy: RolePolicy,
    /// Comma-separated roles the deployment recognises.
    #[ortho_config(default = default_known_roles_string())]
    pub known_roles: String,
    /// Handlers running longer than this many milliseconds are logged.
    /// Zero disables the warning.
    #[ortho_config(default = default_slow_handler_warn_ms())]
    pub slow_handler_warn_ms: u64,
    /// Number of threads executing dispatched requests.
    #[ortho_config(default = default_dispatch_workers())]
    pub dispatch_workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
            role_policy: default_role_policy(),
            known_roles: default_known_roles_string(),
            slow_handler_warn_ms: default_slow_handler_warn_ms(),
            dispatch_workers: default_dispatch_workers(),
        }
    }
}

impl Config {
    /// Log filter expression handed to the subscriber.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Configured log output format.
    #[must_use]
    pub const fn log_format(&self) -> LogFormat {
        self.log_format
    }

    /// Configured role validation policy.
    #[must_use]
    pub const fn role_policy(&self) -> RolePolicy {
        self.role_policy
    }

    /// Known roles as trimmed, de-duplicated names.
    #[must_use]
    pub fn known_roles(&self) -> Vec<String> {
        split_role_list(&self.known_roles)
    }

    /// Slow handler threshold, or `None` when warnings are disabled.
    #[must_use]
    pub const fn slow_handler_threshold(&self) -> Option<Duration> {
        if self.slow_handler_warn_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.slow_handler_warn_ms))
        }
    }

    /// Worker count for the dispatch pool; never below one.
    #[must_use]
    pub fn dispatch_workers(&self) -> usize {
        self.dispatch_workers.max(1)
    }
}
