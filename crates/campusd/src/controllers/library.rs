//! Library routes: catalogue search, stock management and loans.

use std::sync::Arc;

use campus_router::{Controller, HandlerResult, Request, RouteDescriptor};

use super::{caller, done, parsed_or, settle};
use crate::services::{Book, Catalogue};

/// Serves the `library/*` routes.
#[derive(Debug)]
pub struct LibraryController {
    catalogue: Arc<Catalogue>,
}

impl LibraryController {
    /// Creates the controller over `catalogue`.
    #[must_use]
    pub const fn new(catalogue: Arc<Catalogue>) -> Self {
        Self { catalogue }
    }

    fn search(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let query = request.param("q").unwrap_or_default();
            let books = self.catalogue.search(query)?;
            done(&format!("{} book(s) found", books.len()), &books)
        })
    }

    fn add_book(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let book = Book::new(
                request.require_param("isbn")?,
                request.require_param("title")?,
                request.require_param("author")?,
                parsed_or(request, "copies", 1)?,
            );
            let added = self.catalogue.add(book)?;
            done("book added", &added)
        })
    }

    fn remove_book(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let removed = self.catalogue.remove(request.require_param("isbn")?)?;
            done("book removed", &removed)
        })
    }

    fn borrow(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let borrower = caller(request)?;
            let loan = self
                .catalogue
                .borrow(request.require_param("isbn")?, borrower)?;
            done("book borrowed", &loan)
        })
    }

    fn give_back(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let borrower = caller(request)?;
            let loan = self
                .catalogue
                .give_back(request.require_param("isbn")?, borrower)?;
            done("book returned", &loan)
        })
    }

    fn loans(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let loans = self.catalogue.loans_of(caller(request)?)?;
            done(&format!("{} loan(s)", loans.len()), &loans)
        })
    }
}

impl Controller for LibraryController {
    fn routes() -> Vec<RouteDescriptor<Self>> {
        vec![
            RouteDescriptor::new(
                "library/book/search",
                "student,teacher,admin",
                "search the catalogue by isbn, title or author (q)",
                Self::search,
            ),
            RouteDescriptor::new(
                "library/admin/book/add",
                "admin",
                "catalogue a new title (isbn, title, author, copies)",
                Self::add_book,
            ),
            RouteDescriptor::new(
                "library/admin/book/remove",
                "admin",
                "withdraw a title with no copies on loan (isbn)",
                Self::remove_book,
            ),
            RouteDescriptor::new(
                "library/student/borrow",
                "student",
                "borrow one copy (isbn)",
                Self::borrow,
            ),
            RouteDescriptor::new(
                "library/student/return",
                "student",
                "return a borrowed copy (isbn)",
                Self::give_back,
            ),
            RouteDescriptor::new(
                "library/student/loans",
                "student",
                "list the caller's loans",
                Self::loans,
            ),
        ]
    }

    fn name() -> &'static str {
        "library"
    }
}
