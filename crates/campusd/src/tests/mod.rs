//! Test suites for the campus server bootstrap.

mod support;
mod unit;
