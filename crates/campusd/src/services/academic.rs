//! Course catalogue, enrolments and grades.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use serde::Serialize;
use strum::{Display, EnumString};

use super::{ServiceError, lock};

const SERVICE: &str = "registrar";

/// Letter grade awarded for a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Grade {
    /// Excellent.
    A,
    /// Good.
    B,
    /// Satisfactory.
    C,
    /// Sufficient.
    D,
    /// Fail.
    F,
}

/// A course offering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Course {
    /// Course code, unique within the registrar.
    pub code: String,
    /// Title.
    pub title: String,
    /// Identity of the teacher running the course.
    pub teacher: String,
    /// Maximum enrolment.
    pub capacity: usize,
}

impl Course {
    /// Creates a course.
    #[must_use]
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        teacher: impl Into<String>,
        capacity: usize,
    ) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            teacher: teacher.into(),
            capacity,
        }
    }
}

/// Course listing entry with the current enrolment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseSummary {
    /// The course.
    #[serde(flatten)]
    pub course: Course,
    /// Students enrolled.
    pub enrolled: usize,
}

/// A recorded grade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GradeRecord {
    /// Course code.
    pub course: String,
    /// Student identity.
    pub student: String,
    /// Awarded grade.
    pub grade: Grade,
}

#[derive(Debug, Default)]
struct Rolls {
    courses: BTreeMap<String, Course>,
    enrolments: BTreeMap<String, BTreeSet<String>>,
    grades: BTreeMap<(String, String), Grade>,
}

/// Courses and the students taking them.
#[derive(Debug, Default)]
pub struct Registrar {
    rolls: Mutex<Rolls>,
}

impl Registrar {
    /// Registrar offering `courses`; a repeated code keeps the last entry.
    #[must_use]
    pub fn with_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let courses = courses
            .into_iter()
            .map(|course| (course.code.clone(), course))
            .collect();
        Self {
            rolls: Mutex::new(Rolls {
                courses,
                ..Rolls::default()
            }),
        }
    }

    /// All courses ordered by code.
    ///
    /// # Errors
    ///
    /// Fails when the registrar state is unavailable.
    pub fn courses(&self) -> Result<Vec<CourseSummary>, ServiceError> {
        let rolls = lock(&self.rolls, SERVICE)?;
        Ok(rolls
            .courses
            .values()
            .map(|course| CourseSummary {
                course: course.clone(),
                enrolled: rolls.enrolments.get(&course.code).map_or(0, BTreeSet::len),
            })
            .collect())
    }

    /// Enrols `student` on `code`.
    ///
    /// # Errors
    ///
    /// Fails when the course is unknown or full, or the student is already
    /// enrolled.
    pub fn enroll(&self, code: &str, student: &str) -> Result<CourseSummary, ServiceError> {
        let mut rolls = lock(&self.rolls, SERVICE)?;
        let course = rolls
            .courses
            .get(code)
            .cloned()
            .ok_or_else(|| ServiceError::not_found("course", code))?;
        let roster = rolls.enrolments.entry(code.to_owned()).or_default();
        if roster.contains(student) {
            return Err(ServiceError::conflict(format!(
                "{student} is already enrolled on {code}"
            )));
        }
        if roster.len() >= course.capacity {
            return Err(ServiceError::conflict(format!("{code} is full")));
        }
        roster.insert(student.to_owned());
        let enrolled = roster.len();
        Ok(CourseSummary { course, enrolled })
    }

    /// Records `grade` for `student` on a course run by `teacher`.
    ///
    /// # Errors
    ///
    /// Fails when the course is unknown, run by someone else, or the student
    /// is not enrolled.
    pub fn grade(
        &self,
        code: &str,
        teacher: &str,
        student: &str,
        grade: Grade,
    ) -> Result<GradeRecord, ServiceError> {
        let mut rolls = lock(&self.rolls, SERVICE)?;
        let course = rolls
            .courses
            .get(code)
            .ok_or_else(|| ServiceError::not_found("course", code))?;
        if course.teacher != teacher {
            return Err(ServiceError::conflict(format!(
                "{code} is not taught by {teacher}"
            )));
        }
        let enrolled = rolls
            .enrolments
            .get(code)
            .is_some_and(|roster| roster.contains(student));
        if !enrolled {
            return Err(ServiceError::not_found(
                "enrolment",
                format!("{student}/{code}"),
            ));
        }
        rolls
            .grades
            .insert((code.to_owned(), student.to_owned()), grade);
        Ok(GradeRecord {
            course: code.to_owned(),
            student: student.to_owned(),
            grade,
        })
    }
}
