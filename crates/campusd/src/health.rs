//! Structured health reporting for server lifecycle events.

use std::sync::Arc;

use campus_config::Config;
use campus_router::RegistrationReport;

use crate::bootstrap::BootstrapError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer for lifecycle events, so operators and tests can follow start-up.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked once the route table is built.
    fn routes_registered(&self, report: &RegistrationReport);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn routes_registered(&self, report: &RegistrationReport) {
        (**self).routes_registered(report);
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }
}

/// Reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting campus bootstrap"
        );
    }

    fn routes_registered(&self, report: &RegistrationReport) {
        if report.is_clean() {
            tracing::info!(
                target: HEALTH_TARGET,
                event = "routes_registered",
                routes = report.registered,
                "route table built"
            );
        } else {
            tracing::warn!(
                target: HEALTH_TARGET,
                event = "routes_registered",
                routes = report.registered,
                replaced = report.replaced.len(),
                rejected = report.rejected.len(),
                failed_controllers = report.failed_controllers.len(),
                "route table built with registration problems"
            );
        }
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            role_policy = %config.role_policy(),
            dispatch_workers = config.dispatch_workers(),
            "campus bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "campus bootstrap failed"
        );
    }
}
