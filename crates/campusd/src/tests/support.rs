//! Test doubles and the scenario world for the bootstrap suites.

use std::ffi::OsString;
use std::sync::{Arc, Mutex};

use campus_config::Config;
use campus_router::{RegistrationReport, Request, Response, RoleSession};
use ortho_config::{OrthoConfig, OrthoError};

use crate::bootstrap::{BootstrapError, Campus, ConfigLoader, StaticConfigLoader, bootstrap_with};
use crate::health::HealthReporter;
use crate::services::Services;

/// Configuration used by healthy scenarios.
pub fn quiet_config() -> Config {
    Config {
        log_filter: "warn".to_owned(),
        ..Config::default()
    }
}

/// Loader that fails by passing a malformed CLI value.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_iter([
            OsString::from("campusd"),
            OsString::from("--dispatch-workers"),
            OsString::from("many"),
        ])
    }
}

/// Lifecycle events captured by [`RecordingHealthReporter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    BootstrapStarting,
    RoutesRegistered(RegistrationReport),
    BootstrapSucceeded,
    BootstrapFailed(String),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }

    pub fn registration(&self) -> Option<RegistrationReport> {
        self.events().into_iter().find_map(|event| match event {
            HealthEvent::RoutesRegistered(report) => Some(report),
            _ => None,
        })
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn routes_registered(&self, report: &RegistrationReport) {
        self.record(HealthEvent::RoutesRegistered(report.clone()));
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }
}

/// Scenario world shared across BDD steps.
pub struct TestWorld {
    loader: Box<dyn ConfigLoader>,
    pub reporter: Arc<RecordingHealthReporter>,
    campus: Option<Campus>,
    bootstrap_error: Option<BootstrapError>,
    pub pooled: Option<Response>,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            loader: Box::new(StaticConfigLoader::new(quiet_config())),
            reporter: Arc::new(RecordingHealthReporter::default()),
            campus: None,
            bootstrap_error: None,
            pooled: None,
        }
    }

    pub fn use_loader(&mut self, loader: impl ConfigLoader + 'static) {
        self.loader = Box::new(loader);
    }

    pub fn bootstrap(&mut self) {
        match bootstrap_with(&*self.loader, &*self.reporter, &Services::seeded()) {
            Ok(campus) => self.campus = Some(campus),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    pub fn campus(&self) -> Option<&Campus> {
        self.campus.as_ref()
    }

    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    pub fn dispatch_pooled(&mut self, request: Request) {
        let campus = self.campus.as_ref().expect("bootstrap should have succeeded");
        let pool = campus.start_pool().expect("pool starts");
        let response = pool.submit(request).expect("queued").wait();
        pool.shutdown();
        self.pooled = Some(response);
    }
}

/// Request from a single-role session.
pub fn request_as(uri: &str, identity: &str, role: &str) -> Request {
    Request::new(uri, format!("{identity}-{uri}"))
        .with_session(Arc::new(RoleSession::new(identity, [role])))
}

pub fn world() -> TestWorld {
    TestWorld::new()
}
