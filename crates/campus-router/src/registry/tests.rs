//! Unit tests for route registration.

use std::sync::atomic::{AtomicUsize, Ordering};

use campus_config::RolePolicy;
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::handler::{HandlerError, Reply};
use crate::permission::RoleIssue;

#[derive(Debug)]
struct Library {
    books: Vec<&'static str>,
}

impl Library {
    fn search(&self, _request: &Request) -> HandlerResult {
        Ok(Reply::Value(json!(self.books)))
    }

    fn add(&self, request: &Request) -> HandlerResult {
        request
            .param("isbn")
            .map(|isbn| Reply::Value(json!({ "added": isbn })))
            .ok_or_else(|| HandlerError::new("isbn missing"))
    }
}

impl Controller for Library {
    fn routes() -> Vec<RouteDescriptor<Self>> {
        vec![
            RouteDescriptor::new(
                "library/book/search",
                "student,teacher,admin",
                "search the catalogue",
                Self::search,
            ),
            RouteDescriptor::new(
                "library/admin/book/add",
                "admin",
                "add a book",
                Self::add,
            ),
        ]
    }

    fn name() -> &'static str {
        "library"
    }
}

#[derive(Debug)]
struct Broken;

impl Controller for Broken {
    fn routes() -> Vec<RouteDescriptor<Self>> {
        vec![
            RouteDescriptor::new("broken/a", "admin", "never registered", |_, _| {
                Ok(Reply::Value(json!(null)))
            }),
            RouteDescriptor::new("broken/b", "admin", "never registered", |_, _| {
                Ok(Reply::Value(json!(null)))
            }),
        ]
    }
}

#[derive(Debug)]
struct Sloppy;

impl Controller for Sloppy {
    fn routes() -> Vec<RouteDescriptor<Self>> {
        vec![
            RouteDescriptor::new("sloppy/ok", "teacher", "fine", |_, _| {
                Ok(Reply::Value(json!("ok")))
            }),
            RouteDescriptor::new("sloppy/typo", "teacher,,admn", "bad role", |_, _| {
                Ok(Reply::Value(json!("typo")))
            }),
            RouteDescriptor::new("sloppy/open", " anonymous", "padded", |_, _| {
                Ok(Reply::Value(json!("open")))
            }),
            RouteDescriptor::new("sloppy/staff", "admin ", "padded", |_, _| {
                Ok(Reply::Value(json!("staff")))
            }),
        ]
    }
}

fn library() -> Result<Library, HandlerError> {
    Ok(Library {
        books: vec!["Dune", "Emma"],
    })
}

#[fixture]
fn library_table() -> (RouteTable, RegistrationReport) {
    let mut builder = RouteTableBuilder::new();
    builder.register_controller(library);
    builder.build()
}

#[rstest]
fn registers_every_descriptor(library_table: (RouteTable, RegistrationReport)) {
    let (table, report) = library_table;
    assert_eq!(table.uris(), vec!["library/admin/book/add", "library/book/search"]);
    assert_eq!(report.registered, 2);
    assert!(report.is_clean());
}

#[rstest]
fn entries_keep_declared_metadata(library_table: (RouteTable, RegistrationReport)) {
    let (table, _) = library_table;
    let entry = table.get("library/book/search").expect("route");
    assert_eq!(entry.owner(), "library");
    assert_eq!(entry.required_role(), "student,teacher,admin");
    assert_eq!(entry.description(), "search the catalogue");
    assert_eq!(table.required_role("library/admin/book/add"), Some("admin"));
}

#[rstest]
fn handlers_share_the_cached_instance(library_table: (RouteTable, RegistrationReport)) {
    let (table, _) = library_table;
    assert_eq!(table.controllers().len(), 1);
    let cached = table.controllers().get::<Library>().expect("cached library");
    assert_eq!(cached.books, vec!["Dune", "Emma"]);

    let reply = table
        .get("library/book/search")
        .expect("route")
        .handler()
        .call(&Request::new("library/book/search", "r1"))
        .expect("search");
    assert_eq!(reply, Reply::Value(json!(["Dune", "Emma"])));
}

#[test]
fn controller_is_constructed_once() {
    let constructions = AtomicUsize::new(0);
    let build = || {
        constructions.fetch_add(1, Ordering::SeqCst);
        library()
    };

    let mut builder = RouteTableBuilder::new();
    builder.register_controller(build);
    builder.register_controller(build);
    let (table, report) = builder.build();

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert_eq!(table.len(), 2);
    assert_eq!(report.replaced.len(), 2);
}

#[test]
fn failed_construction_registers_nothing() {
    let mut builder = RouteTableBuilder::new();
    builder
        .register_controller(|| Err::<Broken, _>("connection refused"))
        .register_controller(library);
    let (table, report) = builder.build();

    assert!(!table.has_route("broken/a"));
    assert!(!table.has_route("broken/b"));
    assert!(table.has_route("library/book/search"));
    assert_eq!(report.failed_controllers.len(), 1);
    let failed = report.failed_controllers.first().expect("one failure");
    assert!(failed.name.ends_with("Broken"));
    assert_eq!(failed.error, "connection refused");
}

#[test]
fn warn_policy_keeps_questionable_routes() {
    let mut builder = RouteTableBuilder::new()
        .with_policy(RolePolicy::Warn)
        .with_known_roles(["admin", "student", "teacher"]);
    builder.register_controller(|| Ok::<_, HandlerError>(Sloppy));
    let (table, report) = builder.build();

    assert!(table.has_route("sloppy/typo"));
    assert!(table.has_route("sloppy/open"));
    assert!(table.has_route("sloppy/staff"));
    assert!(report.rejected.is_empty());
}

#[test]
fn reject_policy_skips_questionable_routes() {
    let mut builder = RouteTableBuilder::new()
        .with_policy(RolePolicy::Reject)
        .with_known_roles(["admin", "student", "teacher"]);
    builder.register_controller(|| Ok::<_, HandlerError>(Sloppy));
    let (table, report) = builder.build();

    assert!(table.has_route("sloppy/ok"));
    assert!(!table.has_route("sloppy/typo"));
    assert_eq!(report.rejected.len(), 3);
    let rejected = report
        .rejected
        .iter()
        .find(|rejected| rejected.uri == "sloppy/typo")
        .expect("typo rejected");
    assert!(rejected.issues.contains(&RoleIssue::EmptySegment));
    assert!(rejected
        .issues
        .contains(&RoleIssue::UnknownRole("admn".to_owned())));
}

#[test]
fn reject_policy_refuses_padded_roles() {
    let mut builder = RouteTableBuilder::new()
        .with_policy(RolePolicy::Reject)
        .with_known_roles(["admin", "student", "teacher"]);
    builder.register_controller(|| Ok::<_, HandlerError>(Sloppy));
    let (table, report) = builder.build();

    assert!(!table.has_route("sloppy/open"));
    assert!(!table.has_route("sloppy/staff"));
    let padded: Vec<_> = report
        .rejected
        .iter()
        .filter(|rejected| rejected.uri != "sloppy/typo")
        .flat_map(|rejected| rejected.issues.clone())
        .collect();
    assert_eq!(
        padded,
        vec![
            RoleIssue::Padded(" anonymous".to_owned()),
            RoleIssue::Padded("admin ".to_owned()),
        ]
    );
}

#[test]
fn empty_builder_builds_empty_table() {
    let (table, report) = RouteTableBuilder::new().build();
    assert!(table.is_empty());
    assert_eq!(report.registered, 0);
    assert_eq!(table.entries().count(), 0);
}
