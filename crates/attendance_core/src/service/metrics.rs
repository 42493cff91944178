//! Derived attendance metrics.
//!
//! # Responsibility
//! - Compute dashboard percentages from a store snapshot on demand.
//!
//! # Invariants
//! - Per-student percentages default to 100 when no records match.
//! - Subject and semester averages default to 0 when no records match.
//! - Functions are pure: no caching, no store access.

use crate::model::attendance::AttendanceRecord;
use crate::model::semester::Semester;
use crate::model::student::Student;
use chrono::{Days, NaiveDate};

/// Present-rate below which a student is flagged.
pub const LOW_ATTENDANCE_THRESHOLD: f64 = 75.0;

/// Percentage used for a student with no matching records.
pub const NO_RECORDS_STUDENT_PERCENTAGE: f64 = 100.0;

/// Percentage used for a subject or semester with no matching records.
pub const NO_RECORDS_AGGREGATE_PERCENTAGE: f64 = 0.0;

/// Student flagged by [`low_attendance_students`].
#[derive(Debug, Clone, PartialEq)]
pub struct LowAttendanceEntry {
    pub student: Student,
    pub percentage: f64,
}

/// One row of the subject-wise chart.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectAttendance {
    pub subject_id: String,
    pub subject_name: String,
    pub percentage: f64,
    pub record_count: usize,
}

impl SubjectAttendance {
    /// Whole-number value shown in charts.
    pub fn rounded_percentage(&self) -> u32 {
        self.percentage.round() as u32
    }
}

/// Admin dashboard summary cards.
#[derive(Debug, Clone, PartialEq)]
pub struct SemesterOverview {
    pub total_students: usize,
    pub total_subjects: usize,
    pub average_attendance: f64,
}

/// Present count over total count, or `empty` when there are no records.
pub fn present_percentage<'a>(
    records: impl IntoIterator<Item = &'a AttendanceRecord>,
    empty: f64,
) -> f64 {
    let (present, total) = records
        .into_iter()
        .fold((0_usize, 0_usize), |(present, total), record| {
            (present + usize::from(record.is_present()), total + 1)
        });
    if total == 0 {
        return empty;
    }
    present as f64 / total as f64 * 100.0
}

/// Student percentage in the inclusive window `[week_start, week_start + 6]`.
pub fn weekly_attendance_percentage(
    records: &[AttendanceRecord],
    student_id: &str,
    semester_id: &str,
    week_start: NaiveDate,
) -> f64 {
    let week_end = week_start
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX);
    present_percentage(
        records.iter().filter(|record| {
            record.student_id == student_id
                && record.semester_id == semester_id
                && week_start <= record.date
                && record.date <= week_end
        }),
        NO_RECORDS_STUDENT_PERCENTAGE,
    )
}

/// Student percentage over every record in the semester.
pub fn student_semester_percentage(
    records: &[AttendanceRecord],
    student_id: &str,
    semester_id: &str,
) -> f64 {
    present_percentage(
        records
            .iter()
            .filter(|record| record.student_id == student_id && record.semester_id == semester_id),
        NO_RECORDS_STUDENT_PERCENTAGE,
    )
}

/// Student percentage for one subject of the semester.
pub fn student_subject_percentage(
    records: &[AttendanceRecord],
    student_id: &str,
    semester_id: &str,
    subject_id: &str,
) -> f64 {
    present_percentage(
        records.iter().filter(|record| {
            record.student_id == student_id
                && record.semester_id == semester_id
                && record.subject_id == subject_id
        }),
        NO_RECORDS_STUDENT_PERCENTAGE,
    )
}

/// Students below `threshold` in the semester, worst first.
///
/// Ties keep roster order.
pub fn low_attendance_students(
    students: &[Student],
    records: &[AttendanceRecord],
    semester_id: &str,
    threshold: f64,
) -> Vec<LowAttendanceEntry> {
    let mut flagged: Vec<LowAttendanceEntry> = students
        .iter()
        .map(|student| LowAttendanceEntry {
            student: student.clone(),
            percentage: student_semester_percentage(records, &student.id, semester_id),
        })
        .filter(|entry| entry.percentage < threshold)
        .collect();
    flagged.sort_by(|left, right| left.percentage.total_cmp(&right.percentage));
    flagged
}

/// Per-subject present rate for the semester, in subject order.
pub fn subject_wise_attendance(
    semester: &Semester,
    records: &[AttendanceRecord],
) -> Vec<SubjectAttendance> {
    semester
        .subjects
        .iter()
        .map(|subject| {
            let matching: Vec<&AttendanceRecord> = records
                .iter()
                .filter(|record| {
                    record.semester_id == semester.id && record.subject_id == subject.id
                })
                .collect();
            SubjectAttendance {
                subject_id: subject.id.clone(),
                subject_name: subject.name.clone(),
                percentage: present_percentage(
                    matching.iter().copied(),
                    NO_RECORDS_AGGREGATE_PERCENTAGE,
                ),
                record_count: matching.len(),
            }
        })
        .collect()
}

/// Present rate across every record of the semester.
pub fn overall_semester_average(records: &[AttendanceRecord], semester_id: &str) -> f64 {
    present_percentage(
        records
            .iter()
            .filter(|record| record.semester_id == semester_id),
        NO_RECORDS_AGGREGATE_PERCENTAGE,
    )
}

pub fn semester_overview(
    students: &[Student],
    semester: Option<&Semester>,
    records: &[AttendanceRecord],
) -> SemesterOverview {
    SemesterOverview {
        total_students: students.len(),
        total_subjects: semester.map_or(0, |semester| semester.subjects.len()),
        average_attendance: semester.map_or(NO_RECORDS_AGGREGATE_PERCENTAGE, |semester| {
            overall_semester_average(records, &semester.id)
        }),
    }
}
