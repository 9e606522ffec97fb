//! Unit tests for bootstrap wiring.

use std::convert::Infallible;

use campus_config::{Config, RolePolicy};
use campus_router::{
    AlreadyInstalled, Controller, HandlerResult, RegistrationReport, Reply, Request,
    RouteDescriptor, Status,
};
use mockall::{Sequence, mock};
use rstest::rstest;
use serde_json::json;

use super::support::{RecordingHealthReporter, quiet_config, request_as};
use crate::bootstrap::{BootstrapError, StaticConfigLoader, bootstrap_routes, build_routes};
use crate::health::HealthReporter;
use crate::services::Services;

mock! {
    pub Reporter {}
    impl HealthReporter for Reporter {
        fn bootstrap_starting(&self);
        fn routes_registered(&self, report: &RegistrationReport);
        fn bootstrap_succeeded(&self, config: &Config);
        fn bootstrap_failed(&self, error: &BootstrapError);
    }
}

#[derive(Debug)]
struct Broken;

impl Controller for Broken {
    fn routes() -> Vec<RouteDescriptor<Self>> {
        vec![RouteDescriptor::new("broken/op", "admin", "unreachable", |_, _| {
            Ok(Reply::Value(json!(null)))
        })]
    }
}

#[test]
fn empty_route_table_fails_bootstrap() {
    let mut reporter = MockReporter::new();
    let mut sequence = Sequence::new();
    reporter
        .expect_bootstrap_starting()
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    reporter
        .expect_routes_registered()
        .withf(|report| report.registered == 0 && report.failed_controllers.len() == 1)
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    reporter
        .expect_bootstrap_failed()
        .withf(|error| matches!(error, BootstrapError::NoRoutes { failed: 1 }))
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    reporter.expect_bootstrap_succeeded().never();

    let loader = StaticConfigLoader::new(quiet_config());
    let result = bootstrap_routes(&loader, &reporter, |builder, _| {
        builder.register_controller(|| Err::<Broken, _>("database offline"));
    });

    assert!(matches!(result, Err(BootstrapError::NoRoutes { failed: 1 })));
}

#[test]
fn healthy_bootstrap_reports_in_order() {
    let mut reporter = MockReporter::new();
    let mut sequence = Sequence::new();
    reporter
        .expect_bootstrap_starting()
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    reporter
        .expect_routes_registered()
        .withf(RegistrationReport::is_clean)
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    reporter
        .expect_bootstrap_succeeded()
        .times(1)
        .in_sequence(&mut sequence)
        .return_const(());
    reporter.expect_bootstrap_failed().never();

    let loader = StaticConfigLoader::new(quiet_config());
    let campus = crate::bootstrap_with(&loader, &reporter, &Services::seeded()).expect("campus");
    assert_eq!(campus.config(), &quiet_config());
}

#[rstest]
#[case(0, None)]
#[case(250, Some(250))]
fn slow_handler_threshold_follows_config(#[case] warn_ms: u64, #[case] expected: Option<u64>) {
    let config = Config {
        slow_handler_warn_ms: warn_ms,
        ..quiet_config()
    };
    let (dispatcher, _) = build_routes(&config, |_, _| {});
    assert_eq!(
        dispatcher.options().slow_handler_threshold,
        expected.map(std::time::Duration::from_millis)
    );
}

#[test]
fn custom_routes_see_the_configured_known_roles() {
    let config = Config {
        known_roles: "admin, librarian".to_owned(),
        role_policy: RolePolicy::Reject,
        ..quiet_config()
    };
    let (dispatcher, report) = build_routes(&config, |builder, known_roles| {
        assert_eq!(known_roles, ["admin", "librarian"]);
        builder
            .route("desk/checkin", "librarian", "desk", |_: &Request| -> HandlerResult {
                Ok(Reply::Value(json!("checked in")))
            })
            .route("desk/audit", "auditor", "desk", |_: &Request| -> HandlerResult {
                Ok(Reply::Value(json!("audited")))
            });
    });

    assert!(dispatcher.has_route("desk/checkin"));
    assert!(!dispatcher.has_route("desk/audit"));
    assert_eq!(report.rejected.len(), 1);
}

#[test]
fn publishing_twice_is_refused() {
    let reporter = RecordingHealthReporter::default();
    let loader = StaticConfigLoader::new(quiet_config());
    let campus = crate::bootstrap_with(&loader, &reporter, &Services::seeded()).expect("campus");

    let published = campus.publish().expect("first publication");
    assert!(published.has_route("library/student/borrow"));
    assert_eq!(campus.publish().err(), Some(AlreadyInstalled));

    let response = campus_router::installed()
        .expect("installed dispatcher")
        .route(&request_as("auth/whoami", "ada", "student"));
    assert_eq!(response.status(), Status::Success);
}

#[test]
fn infallible_controllers_never_fail_registration() {
    let config = quiet_config();
    let (dispatcher, report) = build_routes(&config, |builder, _| {
        builder.register_controller(|| Ok::<_, Infallible>(Broken));
    });
    assert!(dispatcher.has_route("broken/op"));
    assert!(report.failed_controllers.is_empty());
}
