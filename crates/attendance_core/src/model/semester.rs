//! Semester and subject model.
//!
//! # Responsibility
//! - Define the semester aggregate and its exclusively owned subjects.
//! - Provide creation/patch request shapes with presence validation.
//!
//! # Invariants
//! - A subject never exists outside its semester.
//! - `faculty_name` is copied from the faculty roster when the subject is
//!   built and is never re-synced afterwards.
//! - `total_periods == 0` is the "not configured" sentinel.

use crate::model::student::Faculty;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Faculty display name used when an assignment points at an unknown id.
pub const UNKNOWN_FACULTY_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub faculty_id: String,
    /// Cached copy of the faculty display name at assignment time.
    pub faculty_name: String,
    pub total_periods: u32,
}

impl Subject {
    /// Returns whether attendance can be marked for this subject.
    pub fn periods_configured(&self) -> bool {
        self.total_periods > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Semester {
    pub id: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub subjects: Vec<Subject>,
}

impl Semester {
    /// Inclusive date-range check used by active semester selection.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    pub fn subject(&self, subject_id: &str) -> Option<&Subject> {
        self.subjects.iter().find(|subject| subject.id == subject_id)
    }

    pub fn subject_mut(&mut self, subject_id: &str) -> Option<&mut Subject> {
        self.subjects
            .iter_mut()
            .find(|subject| subject.id == subject_id)
    }

    /// Subjects assigned to one faculty member, in semester order.
    pub fn subjects_for_faculty(&self, faculty_id: &str) -> Vec<&Subject> {
        self.subjects
            .iter()
            .filter(|subject| subject.faculty_id == faculty_id)
            .collect()
    }
}

/// Presence-check failures for semester creation input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SemesterValidationError {
    BlankName,
    NoSubjects,
    BlankSubjectName { index: usize },
    BlankFacultyId { index: usize },
}

impl Display for SemesterValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "semester name must not be blank"),
            Self::NoSubjects => write!(f, "semester must have at least one subject"),
            Self::BlankSubjectName { index } => {
                write!(f, "subject #{index} name must not be blank")
            }
            Self::BlankFacultyId { index } => {
                write!(f, "subject #{index} must be assigned to a faculty member")
            }
        }
    }
}

impl Error for SemesterValidationError {}

/// One subject row in the semester form: name plus assigned faculty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectAssignment {
    pub name: String,
    pub faculty_id: String,
}

/// Semester creation request. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSemester {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub subjects: Vec<Subject>,
}

impl NewSemester {
    /// Builds a request from form assignments.
    ///
    /// Each subject gets a fresh id and `total_periods = 0`. Faculty names
    /// are resolved against `faculties`, falling back to
    /// [`UNKNOWN_FACULTY_NAME`].
    pub fn from_assignments(
        name: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        assignments: &[SubjectAssignment],
        faculties: &[Faculty],
    ) -> Self {
        Self {
            name: name.into(),
            start_date,
            end_date,
            subjects: build_subjects(assignments, faculties),
        }
    }

    /// Checks the fields the semester form requires.
    pub fn validate(&self) -> Result<(), SemesterValidationError> {
        if self.name.trim().is_empty() {
            return Err(SemesterValidationError::BlankName);
        }
        validate_subjects(&self.subjects)
    }

    pub(crate) fn into_semester(self, id: String) -> Semester {
        Semester {
            id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            subjects: self.subjects,
        }
    }
}

/// Partial update merged into an existing semester. `None` keeps the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemesterPatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub subjects: Option<Vec<Subject>>,
}

impl SemesterPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.subjects.is_none()
    }

    /// Checks only the fields that are present.
    pub fn validate(&self) -> Result<(), SemesterValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(SemesterValidationError::BlankName);
            }
        }
        match &self.subjects {
            Some(subjects) => validate_subjects(subjects),
            None => Ok(()),
        }
    }

    pub(crate) fn apply_to(self, semester: &mut Semester) {
        if let Some(name) = self.name {
            semester.name = name;
        }
        if let Some(start_date) = self.start_date {
            semester.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            semester.end_date = end_date;
        }
        if let Some(subjects) = self.subjects {
            semester.subjects = subjects;
        }
    }
}

/// Builds subjects for a semester form submission.
pub fn build_subjects(assignments: &[SubjectAssignment], faculties: &[Faculty]) -> Vec<Subject> {
    assignments
        .iter()
        .map(|assignment| {
            let faculty_name = faculties
                .iter()
                .find(|faculty| faculty.id == assignment.faculty_id)
                .map_or(UNKNOWN_FACULTY_NAME, |faculty| faculty.name.as_str());
            Subject {
                id: new_subject_id(),
                name: assignment.name.clone(),
                faculty_id: assignment.faculty_id.clone(),
                faculty_name: faculty_name.to_string(),
                total_periods: 0,
            }
        })
        .collect()
}

pub(crate) fn new_semester_id() -> String {
    format!("sem-{}", Uuid::new_v4())
}

fn new_subject_id() -> String {
    format!("sub-{}", Uuid::new_v4())
}

fn validate_subjects(subjects: &[Subject]) -> Result<(), SemesterValidationError> {
    if subjects.is_empty() {
        return Err(SemesterValidationError::NoSubjects);
    }
    for (index, subject) in subjects.iter().enumerate() {
        if subject.name.trim().is_empty() {
            return Err(SemesterValidationError::BlankSubjectName { index });
        }
        if subject.faculty_id.trim().is_empty() {
            return Err(SemesterValidationError::BlankFacultyId { index });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{NewSemester, SemesterValidationError, SubjectAssignment, UNKNOWN_FACULTY_NAME};
    use crate::model::student::Faculty;
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    fn faculties() -> Vec<Faculty> {
        vec![Faculty {
            id: "f1".to_string(),
            name: "Dr. Sarah Johnson".to_string(),
            email: "faculty1@college.edu".to_string(),
        }]
    }

    #[test]
    fn from_assignments_resolves_faculty_names_and_zeroes_periods() {
        let assignments = vec![
            SubjectAssignment {
                name: "Compilers".to_string(),
                faculty_id: "f1".to_string(),
            },
            SubjectAssignment {
                name: "Graphics".to_string(),
                faculty_id: "f404".to_string(),
            },
        ];
        let request = NewSemester::from_assignments(
            "Fall 2026",
            date("2026-08-15"),
            date("2026-12-15"),
            &assignments,
            &faculties(),
        );

        assert_eq!(request.subjects.len(), 2);
        assert_eq!(request.subjects[0].faculty_name, "Dr. Sarah Johnson");
        assert_eq!(request.subjects[1].faculty_name, UNKNOWN_FACULTY_NAME);
        assert!(request.subjects.iter().all(|s| s.total_periods == 0));
        assert_ne!(request.subjects[0].id, request.subjects[1].id);
    }

    #[test]
    fn validate_requires_name_and_subjects() {
        let mut request = NewSemester::from_assignments(
            "  ",
            date("2026-08-15"),
            date("2026-12-15"),
            &[],
            &faculties(),
        );
        assert_eq!(request.validate(), Err(SemesterValidationError::BlankName));

        request.name = "Fall 2026".to_string();
        assert_eq!(request.validate(), Err(SemesterValidationError::NoSubjects));
    }
}
