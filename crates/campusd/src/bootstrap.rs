//! Server bootstrap orchestration.

use std::sync::Arc;

use campus_config::Config;
use campus_router::{
    AlreadyInstalled, DispatchOptions, Dispatcher, RegistrationReport, RouteTableBuilder,
};
use ortho_config::{OrthoConfig, OrthoError};
use thiserror::Error;

use crate::controllers;
use crate::health::HealthReporter;
use crate::pool::{DispatchPool, PoolError};
use crate::services::Services;
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the server configuration.
    ///
    /// # Errors
    ///
    /// Returns the loader's error when no valid configuration can be
    /// assembled.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader that delegates to [`Config::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load()
    }
}

/// Loader returning a fixed configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps `config`.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// Registration produced an empty route table.
    #[error("no routes were registered ({failed} controller(s) failed to construct)")]
    NoRoutes {
        /// Controllers whose construction failed.
        failed: usize,
    },
}

/// A bootstrapped server: configuration, route table and dispatcher.
#[derive(Debug)]
pub struct Campus {
    config: Config,
    dispatcher: Dispatcher,
    report: RegistrationReport,
    telemetry: TelemetryHandle,
}

impl Campus {
    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Dispatcher over the registered routes.
    #[must_use]
    pub const fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Outcome of route registration.
    #[must_use]
    pub const fn report(&self) -> &RegistrationReport {
        &self.report
    }

    /// Telemetry handle, primarily useful for testing.
    #[must_use]
    pub const fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }

    /// Starts the dispatch pool sized by `dispatch_workers`.
    ///
    /// # Errors
    ///
    /// Fails when a worker thread cannot be spawned.
    pub fn start_pool(&self) -> Result<DispatchPool, PoolError> {
        DispatchPool::start(&self.dispatcher, self.config.dispatch_workers())
    }

    /// Publishes the dispatcher process-wide and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`AlreadyInstalled`] when a dispatcher was published earlier.
    pub fn publish(&self) -> Result<&'static Dispatcher, AlreadyInstalled> {
        campus_router::install(self.dispatcher.clone())
    }
}

/// Builds the dispatcher from the routes `register` adds, under the role
/// policy and slow-handler threshold in `config`.
#[must_use]
pub fn build_routes(
    config: &Config,
    register: impl FnOnce(&mut RouteTableBuilder, &[String]),
) -> (Dispatcher, RegistrationReport) {
    let known_roles = config.known_roles();
    let mut builder = RouteTableBuilder::new()
        .with_policy(config.role_policy())
        .with_known_roles(known_roles.iter().cloned());
    register(&mut builder, &known_roles);
    let (table, report) = builder.build();

    let options = DispatchOptions {
        slow_handler_threshold: config.slow_handler_threshold(),
    };
    (Dispatcher::with_options(table, options), report)
}

/// Bootstraps the server with the campus controllers backed by `services`.
///
/// # Errors
///
/// Fails when configuration cannot be loaded, telemetry cannot be installed,
/// or registration leaves the route table empty.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
    services: &Services,
) -> Result<Campus, BootstrapError> {
    bootstrap_routes(loader, reporter, |builder, known_roles| {
        controllers::register_all(builder, services, known_roles);
    })
}

/// Bootstraps the server with the routes `register` adds.
///
/// # Errors
///
/// As for [`bootstrap_with`].
pub fn bootstrap_routes(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
    register: impl FnOnce(&mut RouteTableBuilder, &[String]),
) -> Result<Campus, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let (dispatcher, report) = build_routes(&config, register);
    reporter.routes_registered(&report);
    if dispatcher.table().is_empty() {
        let error = BootstrapError::NoRoutes {
            failed: report.failed_controllers.len(),
        };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }

    reporter.bootstrap_succeeded(&config);
    Ok(Campus {
        config,
        dispatcher,
        report,
        telemetry,
    })
}
