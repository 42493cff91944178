//! Attendance record model.
//!
//! # Invariants
//! - `RecordKey` is the logical primary key; a later record with the same key
//!   replaces the earlier one.
//! - `period_number` is not bounds-checked against `Subject::total_periods`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn from_present(present: bool) -> Self {
        if present {
            Self::Present
        } else {
            Self::Absent
        }
    }

    pub fn is_present(self) -> bool {
        matches!(self, Self::Present)
    }
}

/// One student's status for one subject period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub student_id: String,
    pub subject_id: String,
    pub semester_id: String,
    pub period_number: u32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn key(&self) -> RecordKey<'_> {
        RecordKey {
            student_id: &self.student_id,
            subject_id: &self.subject_id,
            semester_id: &self.semester_id,
            period_number: self.period_number,
        }
    }

    pub fn is_present(&self) -> bool {
        self.status.is_present()
    }

    /// Returns whether this record belongs to the given semester period.
    pub fn is_for_period(&self, semester_id: &str, subject_id: &str, period_number: u32) -> bool {
        self.semester_id == semester_id
            && self.subject_id == subject_id
            && self.period_number == period_number
    }
}

/// Borrowed logical key `(student, subject, semester, period)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey<'a> {
    pub student_id: &'a str,
    pub subject_id: &'a str,
    pub semester_id: &'a str,
    pub period_number: u32,
}
