//! Campus management server: bootstrap, controllers and dispatch pool.
//!
//! The server wires the [`campus_router`] dispatcher to the campus business
//! areas (authentication, library, shop and academics). Start-up follows a
//! fixed sequence, each step reported through a [`HealthReporter`]:
//!
//! 1. load [`campus_config::Config`] through a [`ConfigLoader`];
//! 2. install structured telemetry;
//! 3. register every controller with the configured role policy, producing
//!    an immutable route table and a registration report;
//! 4. build the [`campus_router::Dispatcher`] and, optionally, publish it
//!    process-wide and start a [`DispatchPool`].
//!
//! The socket transport and login subsystem live outside this crate. They
//! hand decoded requests, with the authenticated session attached, to the
//! pool and write back whatever response they receive.

mod bootstrap;
pub mod controllers;
mod health;
mod pool;
pub mod services;
pub mod telemetry;

pub use bootstrap::{
    BootstrapError, Campus, ConfigLoader, StaticConfigLoader, SystemConfigLoader,
    bootstrap_routes, bootstrap_with, build_routes,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use pool::{DispatchPool, PendingReply, PoolError};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
