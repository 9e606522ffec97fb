//! In-memory business services backing the controllers.
//!
//! Persistence sits outside the router. These stores keep their state behind
//! a mutex so a single instance can be shared by every dispatch worker; a
//! production deployment swaps them for database-backed equivalents with the
//! same methods.

mod academic;
mod library;
mod shop;

use std::sync::{Arc, Mutex, MutexGuard};

use thiserror::Error;

pub use self::academic::{Course, CourseSummary, Grade, GradeRecord, Registrar};
pub use self::library::{Book, Catalogue, Loan};
pub use self::shop::{Order, Product, Store};

/// Failures raised by the business services.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The addressed record does not exist.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Record kind, for example `book`.
        kind: &'static str,
        /// Lookup key supplied by the caller.
        key: String,
    },
    /// The operation conflicts with the current state.
    #[error("{0}")]
    Conflict(String),
    /// The service state cannot be read.
    #[error("{service} state is unavailable")]
    Unavailable {
        /// Service name.
        service: &'static str,
    },
}

impl ServiceError {
    pub(crate) fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Returns `true` when the caller can fix the request and retry.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Conflict(_))
    }
}

/// Locks `state`, mapping poisoning to [`ServiceError::Unavailable`].
pub(crate) fn lock<'a, T>(
    state: &'a Mutex<T>,
    service: &'static str,
) -> Result<MutexGuard<'a, T>, ServiceError> {
    state
        .lock()
        .map_err(|_| ServiceError::Unavailable { service })
}

/// Service handles injected into the controllers.
#[derive(Debug, Clone, Default)]
pub struct Services {
    /// Library catalogue and loans.
    pub catalogue: Arc<Catalogue>,
    /// Campus shop products and orders.
    pub store: Arc<Store>,
    /// Courses, enrolments and grades.
    pub registrar: Arc<Registrar>,
}

impl Services {
    /// Services pre-populated with a small demonstration data set.
    #[must_use]
    pub fn seeded() -> Self {
        let catalogue = Catalogue::with_books([
            Book::new("9780441013593", "Dune", "Frank Herbert", 2),
            Book::new("9780141439587", "Emma", "Jane Austen", 1),
            Book::new("9780262033848", "Introduction to Algorithms", "Cormen et al.", 3),
        ]);
        let store = Store::with_products([
            Product::new("MUG-01", "Campus mug", 850, 40),
            Product::new("HOOD-M", "Hoodie (M)", 3200, 12),
            Product::new("NOTE-A5", "A5 notebook", 300, 200),
        ]);
        let registrar = Registrar::with_courses([
            Course::new("CS101", "Programming I", "t.lovelace", 30),
            Course::new("MA201", "Linear Algebra", "t.noether", 25),
        ]);

        Self {
            catalogue: Arc::new(catalogue),
            store: Arc::new(store),
            registrar: Arc::new(registrar),
        }
    }
}
