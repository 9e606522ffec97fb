//! Layering tests for configuration sources.
//!
//! Each test loads [`Config`] from an explicit argument list so the process
//! arguments of the test harness never leak into the result. Environment
//! mutation is serialised through a global mutex and undone on drop.

use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use campus_config::{Config, LogFormat, RolePolicy};
use once_cell::sync::Lazy;
use ortho_config::OrthoConfig;
use rstest::rstest;
use tempfile::TempDir;

static ENV_MUTEX: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

struct EnvOverride {
    key: &'static str,
    previous: Option<OsString>,
}

impl EnvOverride {
    fn set_var(key: &'static str, value: &OsStr) -> Self {
        let previous = std::env::var_os(key);
        // Environment mutation is `unsafe` on edition 2024; the override is
        // restored in `Drop` and callers hold `ENV_MUTEX`.
        unsafe { std::env::set_var(key, value) };
        Self { key, previous }
    }
}

impl Drop for EnvOverride {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(value) => unsafe { std::env::set_var(self.key, value) },
            None => unsafe { std::env::remove_var(self.key) },
        }
    }
}

fn lock_env() -> MutexGuard<'static, ()> {
    ENV_MUTEX
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn write_config(dir: &Path, contents: &str) -> OsString {
    let path = dir.join("campus.toml");
    fs::write(&path, contents).expect("write configuration");
    path.into_os_string()
}

fn args(extra: &[&str]) -> Vec<OsString> {
    let mut args = vec![OsString::from("campusd")];
    args.extend(extra.iter().map(OsString::from));
    args
}

#[test]
fn defaults_apply_without_sources() {
    let _guard = lock_env();
    let config = Config::load_from_iter(args(&[])).expect("load defaults");
    assert_eq!(config, Config::default());
}

#[test]
fn file_values_override_defaults() {
    let _guard = lock_env();
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        dir.path(),
        "log_format = \"compact\"\nrole_policy = \"reject\"\nknown_roles = \"admin,librarian\"\n",
    );

    let mut cli = args(&["--config-path"]);
    cli.push(path);
    let config = Config::load_from_iter(cli).expect("load file");

    assert_eq!(config.log_format(), LogFormat::Compact);
    assert_eq!(config.role_policy(), RolePolicy::Reject);
    assert_eq!(config.known_roles(), vec!["admin", "librarian"]);
}

#[test]
fn environment_overrides_file() {
    let _guard = lock_env();
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(dir.path(), "slow_handler_warn_ms = 100\n");
    let _env = EnvOverride::set_var("CAMPUS_SLOW_HANDLER_WARN_MS", OsStr::new("750"));

    let mut cli = args(&["--config-path"]);
    cli.push(path);
    let config = Config::load_from_iter(cli).expect("load env");

    assert_eq!(config.slow_handler_warn_ms, 750);
}

#[rstest]
#[case::log_filter(&["--log-filter", "campusd=debug"], "campusd=debug")]
#[case::inline_value(&["--log-filter=warn"], "warn")]
fn cli_overrides_environment(#[case] flags: &[&str], #[case] expected: &str) {
    let _guard = lock_env();
    let _env = EnvOverride::set_var("CAMPUS_LOG_FILTER", OsStr::new("error"));

    let config = Config::load_from_iter(args(flags)).expect("load cli");

    assert_eq!(config.log_filter(), expected);
}

#[test]
fn malformed_file_fails_fast() {
    let _guard = lock_env();
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(dir.path(), "dispatch_workers = not_a_number\n");

    let mut cli = args(&["--config-path"]);
    cli.push(path);
    let result = Config::load_from_iter(cli);

    assert!(result.is_err(), "malformed configuration must not load");
}
