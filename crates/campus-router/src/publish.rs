//! Process-wide publication of the dispatcher.
//!
//! The dispatcher is built once during start-up and then read by every
//! worker. [`install`] publishes it; the first call wins and later calls fail
//! with [`AlreadyInstalled`] so a second bootstrap cannot swap the table
//! under running requests.

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::info;

use crate::dispatch::Dispatcher;

static DISPATCHER: OnceCell<Dispatcher> = OnceCell::new();

const PUBLISH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::publish");

/// Raised when a dispatcher has already been published.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a dispatcher has already been installed for this process")]
pub struct AlreadyInstalled;

/// Publishes `dispatcher` for the rest of the process lifetime.
///
/// # Errors
///
/// Returns [`AlreadyInstalled`] when an earlier call already succeeded. The
/// rejected dispatcher is dropped.
pub fn install(dispatcher: Dispatcher) -> Result<&'static Dispatcher, AlreadyInstalled> {
    let routes = dispatcher.table().len();
    DISPATCHER.set(dispatcher).map_err(|_| AlreadyInstalled)?;
    info!(target: PUBLISH_TARGET, routes, "dispatcher installed");
    DISPATCHER.get().ok_or(AlreadyInstalled)
}

/// The published dispatcher, if any.
#[must_use]
pub fn installed() -> Option<&'static Dispatcher> {
    DISPATCHER.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RouteTableBuilder;

    fn dispatcher() -> Dispatcher {
        let mut builder = RouteTableBuilder::new();
        builder.route("ping", "anonymous", "liveness check", |_: &crate::Request| -> crate::HandlerResult {
            Ok(crate::Reply::Value(serde_json::json!("pong")))
        });
        Dispatcher::new(builder.build().0)
    }

    #[test]
    fn first_install_wins() {
        let published = install(dispatcher()).expect("first install succeeds");
        assert!(published.has_route("ping"));
        assert!(installed().is_some_and(|current| std::ptr::eq(current, published)));
        assert_eq!(install(dispatcher()).err(), Some(AlreadyInstalled));
    }
}
