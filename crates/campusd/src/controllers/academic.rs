//! Academic routes: course listing, enrolment and grading.

use std::sync::Arc;

use campus_router::{Controller, HandlerResult, Request, RouteDescriptor};

use super::{caller, done, parsed, settle};
use crate::services::{Grade, Registrar};

/// Serves the `academic/*` routes.
#[derive(Debug)]
pub struct AcademicController {
    registrar: Arc<Registrar>,
}

impl AcademicController {
    /// Creates the controller over `registrar`.
    #[must_use]
    pub const fn new(registrar: Arc<Registrar>) -> Self {
        Self { registrar }
    }

    fn courses(&self, _request: &Request) -> HandlerResult {
        settle(|| done("courses", &self.registrar.courses()?))
    }

    fn enroll(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let student = caller(request)?;
            let summary = self
                .registrar
                .enroll(request.require_param("course")?, student)?;
            done("enrolled", &summary)
        })
    }

    fn grade(&self, request: &Request) -> HandlerResult {
        settle(|| {
            let teacher = caller(request)?;
            let grade: Grade = parsed(request, "grade")?;
            let record = self.registrar.grade(
                request.require_param("course")?,
                teacher,
                request.require_param("student")?,
                grade,
            )?;
            done("grade recorded", &record)
        })
    }
}

impl Controller for AcademicController {
    fn routes() -> Vec<RouteDescriptor<Self>> {
        vec![
            RouteDescriptor::new(
                "academic/course/list",
                "student,teacher,admin",
                "list courses with enrolment counts",
                Self::courses,
            ),
            RouteDescriptor::new(
                "academic/student/enroll",
                "student",
                "enrol the caller on a course (course)",
                Self::enroll,
            ),
            RouteDescriptor::new(
                "academic/teacher/grade",
                "teacher",
                "grade a student on the caller's course (course, student, grade)",
                Self::grade,
            ),
        ]
    }

    fn name() -> &'static str {
        "academic"
    }
}
