//! Library catalogue and loan ledger.

use std::collections::BTreeMap;
use std::sync::Mutex;

use serde::Serialize;

use super::{ServiceError, lock};

const SERVICE: &str = "catalogue";

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// ISBN, unique within the catalogue.
    pub isbn: String,
    /// Title.
    pub title: String,
    /// Author line.
    pub author: String,
    /// Copies owned by the library.
    pub copies: u32,
    /// Copies currently on loan.
    pub on_loan: u32,
}

impl Book {
    /// Creates a book with no copies on loan.
    #[must_use]
    pub fn new(
        isbn: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        copies: u32,
    ) -> Self {
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            copies,
            on_loan: 0,
        }
    }

    /// Copies on the shelf.
    #[must_use]
    pub const fn available(&self) -> u32 {
        self.copies.saturating_sub(self.on_loan)
    }

    fn matches(&self, query: &str) -> bool {
        query.is_empty()
            || self.isbn == query
            || self.title.to_lowercase().contains(query)
            || self.author.to_lowercase().contains(query)
    }
}

/// A copy lent to a borrower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Loan {
    /// Borrowed book.
    pub isbn: String,
    /// Borrower identity.
    pub borrower: String,
}

#[derive(Debug, Default)]
struct Ledger {
    books: BTreeMap<String, Book>,
    loans: Vec<Loan>,
}

/// Books and the loans against them.
#[derive(Debug, Default)]
pub struct Catalogue {
    ledger: Mutex<Ledger>,
}

impl Catalogue {
    /// Catalogue holding `books`; a repeated isbn keeps the last entry.
    #[must_use]
    pub fn with_books(books: impl IntoIterator<Item = Book>) -> Self {
        let books = books
            .into_iter()
            .map(|book| (book.isbn.clone(), book))
            .collect();
        Self {
            ledger: Mutex::new(Ledger {
                books,
                loans: Vec::new(),
            }),
        }
    }

    /// Books whose isbn equals `query` or whose title or author contains it,
    /// ignoring case. An empty query lists the whole catalogue.
    ///
    /// # Errors
    ///
    /// Fails when the catalogue state is unavailable.
    pub fn search(&self, query: &str) -> Result<Vec<Book>, ServiceError> {
        let needle = query.trim().to_lowercase();
        let ledger = lock(&self.ledger, SERVICE)?;
        Ok(ledger
            .books
            .values()
            .filter(|book| book.matches(&needle))
            .cloned()
            .collect())
    }

    /// Adds a new title.
    ///
    /// # Errors
    ///
    /// Fails with a conflict when the isbn is already catalogued.
    pub fn add(&self, book: Book) -> Result<Book, ServiceError> {
        let mut ledger = lock(&self.ledger, SERVICE)?;
        if ledger.books.contains_key(&book.isbn) {
            return Err(ServiceError::conflict(format!(
                "book already catalogued: {}",
                book.isbn
            )));
        }
        ledger.books.insert(book.isbn.clone(), book.clone());
        Ok(book)
    }

    /// Removes a title that has no copies on loan.
    ///
    /// # Errors
    ///
    /// Fails when the isbn is unknown or copies are still lent out.
    pub fn remove(&self, isbn: &str) -> Result<Book, ServiceError> {
        let mut ledger = lock(&self.ledger, SERVICE)?;
        let on_loan = ledger
            .books
            .get(isbn)
            .map(|book| book.on_loan)
            .ok_or_else(|| ServiceError::not_found("book", isbn))?;
        if on_loan > 0 {
            return Err(ServiceError::conflict(format!(
                "book has {on_loan} copies on loan: {isbn}"
            )));
        }
        ledger
            .books
            .remove(isbn)
            .ok_or_else(|| ServiceError::not_found("book", isbn))
    }

    /// Lends one copy of `isbn` to `borrower`.
    ///
    /// # Errors
    ///
    /// Fails when the isbn is unknown, no copy is on the shelf, or the
    /// borrower already holds a copy.
    pub fn borrow(&self, isbn: &str, borrower: &str) -> Result<Loan, ServiceError> {
        let mut ledger = lock(&self.ledger, SERVICE)?;
        if ledger
            .loans
            .iter()
            .any(|loan| loan.isbn == isbn && loan.borrower == borrower)
        {
            return Err(ServiceError::conflict(format!(
                "{borrower} already holds a copy of {isbn}"
            )));
        }
        let book = ledger
            .books
            .get_mut(isbn)
            .ok_or_else(|| ServiceError::not_found("book", isbn))?;
        if book.available() == 0 {
            return Err(ServiceError::conflict(format!(
                "no copy of {isbn} is available"
            )));
        }
        book.on_loan += 1;

        let loan = Loan {
            isbn: isbn.to_owned(),
            borrower: borrower.to_owned(),
        };
        ledger.loans.push(loan.clone());
        Ok(loan)
    }

    /// Returns the copy of `isbn` held by `borrower`.
    ///
    /// # Errors
    ///
    /// Fails when the borrower holds no copy of the isbn.
    pub fn give_back(&self, isbn: &str, borrower: &str) -> Result<Loan, ServiceError> {
        let mut ledger = lock(&self.ledger, SERVICE)?;
        let position = ledger
            .loans
            .iter()
            .position(|loan| loan.isbn == isbn && loan.borrower == borrower)
            .ok_or_else(|| ServiceError::not_found("loan", format!("{borrower}/{isbn}")))?;
        let loan = ledger.loans.remove(position);
        if let Some(book) = ledger.books.get_mut(isbn) {
            book.on_loan = book.on_loan.saturating_sub(1);
        }
        Ok(loan)
    }

    /// Loans held by `borrower`, oldest first.
    ///
    /// # Errors
    ///
    /// Fails when the catalogue state is unavailable.
    pub fn loans_of(&self, borrower: &str) -> Result<Vec<Loan>, ServiceError> {
        let ledger = lock(&self.ledger, SERVICE)?;
        Ok(ledger
            .loans
            .iter()
            .filter(|loan| loan.borrower == borrower)
            .cloned()
            .collect())
    }
}
