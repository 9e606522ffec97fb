//! `campusd` entry point: bootstraps the router and reports the route table.

use std::process::ExitCode;

use campusd::services::Services;
use campusd::{StructuredHealthReporter, SystemConfigLoader, bootstrap_with};
use tracing::{error, info};

const MAIN_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::main");

fn main() -> ExitCode {
    let reporter = StructuredHealthReporter::new();
    let campus = match bootstrap_with(&SystemConfigLoader, &reporter, &Services::seeded()) {
        Ok(campus) => campus,
        // Already reported by the health reporter.
        Err(_) => return ExitCode::FAILURE,
    };

    if let Err(error) = campus.publish() {
        error!(target: MAIN_TARGET, error = %error, "dispatcher publication failed");
        return ExitCode::FAILURE;
    }

    for (uri, entry) in sorted_routes(&campus) {
        info!(
            target: MAIN_TARGET,
            uri,
            role = entry.required_role(),
            owner = entry.owner(),
            description = entry.description(),
            "route"
        );
    }

    info!(
        target: MAIN_TARGET,
        routes = campus.dispatcher().table().len(),
        "route table published; no transport attached, exiting"
    );
    ExitCode::SUCCESS
}

fn sorted_routes(campus: &campusd::Campus) -> Vec<(&str, &campus_router::RouteEntry)> {
    let mut routes: Vec<_> = campus.dispatcher().table().entries().collect();
    routes.sort_unstable_by_key(|(uri, _)| *uri);
    routes
}
