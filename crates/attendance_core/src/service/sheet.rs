//! Attendance sheet: the batch a faculty member fills in for one period.
//!
//! # Invariants
//! - Every roster student has exactly one entry; new entries start present.
//! - A submitted sheet produces one record per roster student.

use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::student::Student;
use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetEntry {
    pub student_id: String,
    pub present: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceSheet {
    semester_id: String,
    subject_id: String,
    period_number: u32,
    date: NaiveDate,
    entries: Vec<SheetEntry>,
}

impl AttendanceSheet {
    /// Starts a sheet with every student marked present.
    pub fn new(
        students: &[Student],
        semester_id: impl Into<String>,
        subject_id: impl Into<String>,
        period_number: u32,
        date: NaiveDate,
    ) -> Self {
        Self {
            semester_id: semester_id.into(),
            subject_id: subject_id.into(),
            period_number,
            date,
            entries: students
                .iter()
                .map(|student| SheetEntry {
                    student_id: student.id.clone(),
                    present: true,
                })
                .collect(),
        }
    }

    pub fn semester_id(&self) -> &str {
        &self.semester_id
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn period_number(&self) -> u32 {
        self.period_number
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn entries(&self) -> &[SheetEntry] {
        &self.entries
    }

    /// Sets one student's status. Returns `false` for students not on the sheet.
    pub fn set_present(&mut self, student_id: &str, present: bool) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.student_id == student_id)
        {
            Some(entry) => {
                entry.present = present;
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, student_id: &str) -> bool {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.student_id == student_id)
        {
            Some(entry) => {
                entry.present = !entry.present;
                true
            }
            None => false,
        }
    }

    /// Bulk "mark all present" / "mark all absent".
    pub fn set_all(&mut self, present: bool) {
        for entry in &mut self.entries {
            entry.present = present;
        }
    }

    pub fn is_present(&self, student_id: &str) -> Option<bool> {
        self.entries
            .iter()
            .find(|entry| entry.student_id == student_id)
            .map(|entry| entry.present)
    }

    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.present).count()
    }

    pub fn absent_count(&self) -> usize {
        self.entries.len() - self.present_count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_records(&self) -> Vec<AttendanceRecord> {
        self.entries
            .iter()
            .map(|entry| AttendanceRecord {
                student_id: entry.student_id.clone(),
                subject_id: self.subject_id.clone(),
                semester_id: self.semester_id.clone(),
                period_number: self.period_number,
                date: self.date,
                status: AttendanceStatus::from_present(entry.present),
            })
            .collect()
    }
}
