//! Attendance store: semesters, subjects and attendance records.
//!
//! # Responsibility
//! - Own the in-memory semester and attendance collections.
//! - Apply mutations and mirror full state to storage after each one.
//! - Notify subscribed listeners after each state change.
//!
//! # Invariants
//! - At most one record exists per `(student, subject, semester, period)`.
//! - A mutation batch is applied fully in memory before a single write.
//! - Unknown semester/subject ids leave state untouched.
//! - A failed write keeps the in-memory change and switches to memory-only
//!   mode until `flush` succeeds. Listeners see each switch as
//!   `StoreEvent::PersistenceChanged`.

use crate::model::attendance::AttendanceRecord;
use crate::model::semester::{
    new_semester_id, NewSemester, Semester, SemesterPatch, SemesterValidationError, Subject,
};
use crate::model::student::Student;
use crate::repo::kv_repo::KvRepository;
use crate::repo::state_repo::{StateError, StateRepository};
use crate::seed;
use crate::service::notify::{SubscriptionId, Subscribers};
use crate::service::sheet::AttendanceSheet;
use crate::service::PersistenceMode;
use chrono::{Local, NaiveDate};
use log::{error, info};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Validation(SemesterValidationError),
    SemesterNotFound(String),
    SubjectNotFound {
        semester_id: String,
        subject_id: String,
    },
    /// Subject still has `total_periods == 0`.
    PeriodsNotConfigured {
        semester_id: String,
        subject_id: String,
    },
    /// Persisted state could not be loaded at open.
    Load(StateError),
    /// Mutation is applied in memory but could not be written.
    Storage(StateError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::SemesterNotFound(id) => write!(f, "semester not found: {id}"),
            Self::SubjectNotFound {
                semester_id,
                subject_id,
            } => write!(f, "subject {subject_id} not found in semester {semester_id}"),
            Self::PeriodsNotConfigured {
                semester_id,
                subject_id,
            } => write!(
                f,
                "total periods not configured for subject {subject_id} in semester {semester_id}"
            ),
            Self::Load(err) => write!(f, "failed to load attendance state: {err}"),
            Self::Storage(err) => write!(f, "attendance state not persisted: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Load(err) | Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SemesterValidationError> for StoreError {
    fn from(value: SemesterValidationError) -> Self {
        Self::Validation(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    AttendanceMarked {
        inserted: usize,
        replaced: usize,
    },
    SubjectPeriodsUpdated {
        semester_id: String,
        subject_id: String,
        total_periods: u32,
    },
    SemesterAdded(String),
    SemesterUpdated(String),
    /// Writes stopped (`MemoryOnly`) or resumed (`Durable`).
    PersistenceChanged(PersistenceMode),
}

/// Counts from one `mark_attendance` batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkOutcome {
    pub inserted: usize,
    pub replaced: usize,
}

/// Owner of semesters and attendance.
///
/// Mutators return `Ok` once the change is applied in memory and, in
/// `Durable` mode, written. In `MemoryOnly` mode they do not write; check
/// [`AttendanceStore::persistence_mode`] or listen for
/// `StoreEvent::PersistenceChanged`.
pub struct AttendanceStore<R: KvRepository> {
    state: StateRepository<R>,
    students: Vec<Student>,
    semesters: Vec<Semester>,
    attendance: Vec<AttendanceRecord>,
    mode: PersistenceMode,
    subscribers: Subscribers<StoreEvent>,
}

impl<R: KvRepository> AttendanceStore<R> {
    /// Opens the store with the built-in student roster.
    pub fn open(repo: R) -> StoreResult<Self> {
        Self::with_roster(repo, seed::students())
    }

    /// Opens the store with a caller-provided student roster.
    ///
    /// Missing semesters fall back to [`seed::default_semesters`]; missing
    /// attendance starts empty. Untagged state is migrated first; when the
    /// version tag cannot be written the store opens in memory-only mode.
    ///
    /// # Errors
    /// - `Load` when state is tagged with a newer version or is unreadable.
    pub fn with_roster(repo: R, students: Vec<Student>) -> StoreResult<Self> {
        let state = StateRepository::new(repo);
        let found_version = state.check_version().map_err(StoreError::Load)?;
        let mode = match state.migrate_from(found_version) {
            Ok(()) => PersistenceMode::Durable,
            Err(err @ StateError::Repo(_)) => {
                error!(
                    "event=state_migrate module=attendance status=error error_code=storage_write_failed from_version={} error={}",
                    found_version, err
                );
                PersistenceMode::MemoryOnly
            }
            Err(err) => return Err(StoreError::Load(err)),
        };
        let semesters = state
            .load_semesters()
            .map_err(StoreError::Load)?
            .unwrap_or_else(seed::default_semesters);
        let attendance = state
            .load_attendance()
            .map_err(StoreError::Load)?
            .unwrap_or_default();

        info!(
            "event=store_open module=attendance status=ok state_version={} mode={:?} semesters={} records={} students={}",
            found_version,
            mode,
            semesters.len(),
            attendance.len(),
            students.len()
        );

        Ok(Self {
            state,
            students,
            semesters,
            attendance,
            mode,
            subscribers: Subscribers::new(),
        })
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Semesters in creation order.
    pub fn semesters(&self) -> &[Semester] {
        &self.semesters
    }

    pub fn semester(&self, semester_id: &str) -> Option<&Semester> {
        self.semesters
            .iter()
            .find(|semester| semester.id == semester_id)
    }

    pub fn attendance(&self) -> &[AttendanceRecord] {
        &self.attendance
    }

    /// Subjects of one semester assigned to `faculty_id`.
    pub fn faculty_subjects(&self, semester_id: &str, faculty_id: &str) -> Vec<&Subject> {
        self.semester(semester_id)
            .map(|semester| semester.subjects_for_faculty(faculty_id))
            .unwrap_or_default()
    }

    /// Upserts a batch of records by logical key, then writes once.
    ///
    /// An empty batch changes nothing and writes nothing.
    pub fn mark_attendance(
        &mut self,
        records: impl IntoIterator<Item = AttendanceRecord>,
    ) -> StoreResult<MarkOutcome> {
        let mut outcome = MarkOutcome::default();
        for record in records {
            match self
                .attendance
                .iter()
                .position(|existing| existing.key() == record.key())
            {
                Some(index) => {
                    self.attendance[index] = record;
                    outcome.replaced += 1;
                }
                None => {
                    self.attendance.push(record);
                    outcome.inserted += 1;
                }
            }
        }

        if outcome == MarkOutcome::default() {
            return Ok(outcome);
        }

        info!(
            "event=attendance_mark module=attendance status=ok inserted={} replaced={}",
            outcome.inserted, outcome.replaced
        );
        self.commit(StoreEvent::AttendanceMarked {
            inserted: outcome.inserted,
            replaced: outcome.replaced,
        })?;
        Ok(outcome)
    }

    /// Submits a filled sheet for a subject with configured periods.
    ///
    /// # Errors
    /// - `SemesterNotFound` / `SubjectNotFound` for unknown ids.
    /// - `PeriodsNotConfigured` while the subject has `total_periods == 0`.
    pub fn submit_sheet(&mut self, sheet: &AttendanceSheet) -> StoreResult<MarkOutcome> {
        let subject = self.find_subject(sheet.semester_id(), sheet.subject_id())?;
        if !subject.periods_configured() {
            return Err(StoreError::PeriodsNotConfigured {
                semester_id: sheet.semester_id().to_string(),
                subject_id: sheet.subject_id().to_string(),
            });
        }
        self.mark_attendance(sheet.to_records())
    }

    /// Starts a sheet for the store roster with everyone present.
    pub fn new_sheet(
        &self,
        semester_id: &str,
        subject_id: &str,
        period_number: u32,
        date: NaiveDate,
    ) -> AttendanceSheet {
        AttendanceSheet::new(
            &self.students,
            semester_id,
            subject_id,
            period_number,
            date,
        )
    }

    /// Sets a subject's period count. `0` resets it to "not configured".
    pub fn update_subject_periods(
        &mut self,
        semester_id: &str,
        subject_id: &str,
        total_periods: u32,
    ) -> StoreResult<()> {
        let semester = self
            .semesters
            .iter_mut()
            .find(|semester| semester.id == semester_id)
            .ok_or_else(|| StoreError::SemesterNotFound(semester_id.to_string()))?;
        let subject =
            semester
                .subject_mut(subject_id)
                .ok_or_else(|| StoreError::SubjectNotFound {
                    semester_id: semester_id.to_string(),
                    subject_id: subject_id.to_string(),
                })?;
        subject.total_periods = total_periods;

        info!(
            "event=subject_periods_update module=attendance status=ok semester_id={} subject_id={} total_periods={}",
            semester_id, subject_id, total_periods
        );
        self.commit(StoreEvent::SubjectPeriodsUpdated {
            semester_id: semester_id.to_string(),
            subject_id: subject_id.to_string(),
            total_periods,
        })
    }

    /// Validates and appends a semester with a freshly generated id.
    pub fn add_semester(&mut self, request: NewSemester) -> StoreResult<Semester> {
        request.validate()?;
        let semester = request.into_semester(new_semester_id());
        self.semesters.push(semester.clone());

        info!(
            "event=semester_add module=attendance status=ok semester_id={} subjects={}",
            semester.id,
            semester.subjects.len()
        );
        self.commit(StoreEvent::SemesterAdded(semester.id.clone()))?;
        Ok(semester)
    }

    /// Merges the present patch fields into an existing semester.
    pub fn update_semester(
        &mut self,
        semester_id: &str,
        patch: SemesterPatch,
    ) -> StoreResult<Semester> {
        patch.validate()?;
        let semester = self
            .semesters
            .iter_mut()
            .find(|semester| semester.id == semester_id)
            .ok_or_else(|| StoreError::SemesterNotFound(semester_id.to_string()))?;
        patch.apply_to(semester);
        let updated = semester.clone();

        info!(
            "event=semester_update module=attendance status=ok semester_id={}",
            semester_id
        );
        self.commit(StoreEvent::SemesterUpdated(semester_id.to_string()))?;
        Ok(updated)
    }

    /// Active semester for the local current date.
    pub fn active_semester(&self) -> Option<&Semester> {
        self.active_semester_on(Local::now().date_naive())
    }

    /// First semester containing `date`, else the first semester.
    pub fn active_semester_on(&self, date: NaiveDate) -> Option<&Semester> {
        self.semesters
            .iter()
            .find(|semester| semester.contains(date))
            .or_else(|| self.semesters.first())
    }

    /// True once any student's record exists for the period.
    pub fn is_period_submitted(
        &self,
        semester_id: &str,
        subject_id: &str,
        period_number: u32,
    ) -> bool {
        self.attendance
            .iter()
            .any(|record| record.is_for_period(semester_id, subject_id, period_number))
    }

    /// Period numbers with at least one record, ascending.
    pub fn submitted_periods(&self, semester_id: &str, subject_id: &str) -> BTreeSet<u32> {
        self.attendance
            .iter()
            .filter(|record| record.semester_id == semester_id && record.subject_id == subject_id)
            .map(|record| record.period_number)
            .collect()
    }

    pub fn persistence_mode(&self) -> PersistenceMode {
        self.mode
    }

    /// Retries the full-state write and returns to durable mode on success.
    pub fn flush(&mut self) -> StoreResult<()> {
        self.write_state()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    fn find_subject(&self, semester_id: &str, subject_id: &str) -> StoreResult<&Subject> {
        let semester = self
            .semester(semester_id)
            .ok_or_else(|| StoreError::SemesterNotFound(semester_id.to_string()))?;
        semester
            .subject(subject_id)
            .ok_or_else(|| StoreError::SubjectNotFound {
                semester_id: semester_id.to_string(),
                subject_id: subject_id.to_string(),
            })
    }

    fn commit(&mut self, event: StoreEvent) -> StoreResult<()> {
        self.subscribers.notify(&event);
        self.persist()
    }

    /// Writes full state unless the store is memory-only.
    fn persist(&mut self) -> StoreResult<()> {
        if self.mode == PersistenceMode::MemoryOnly {
            return Ok(());
        }
        self.write_state()
    }

    fn write_state(&mut self) -> StoreResult<()> {
        if let Err(err) = self
            .state
            .save_collections(&self.semesters, &self.attendance)
        {
            error!(
                "event=state_persist module=attendance status=error error_code=storage_write_failed error={}",
                err
            );
            self.switch_mode(PersistenceMode::MemoryOnly);
            return Err(StoreError::Storage(err));
        }
        self.switch_mode(PersistenceMode::Durable);
        Ok(())
    }

    fn switch_mode(&mut self, mode: PersistenceMode) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        info!(
            "event=persistence_mode module=attendance status=ok mode={:?}",
            mode
        );
        self.subscribers
            .notify(&StoreEvent::PersistenceChanged(mode));
    }
}

#[cfg(test)]
mod tests {
    use super::{AttendanceStore, StoreError};
    use crate::repo::kv_repo::{KvRepository, MemoryKvRepository};
    use chrono::NaiveDate;

    fn date(value: &str) -> NaiveDate {
        NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn active_semester_prefers_containing_range_then_first() {
        let kv = MemoryKvRepository::new();
        let store = AttendanceStore::open(&kv).unwrap();

        assert_eq!(store.active_semester_on(date("2025-02-01")).unwrap().id, "sem2");
        assert_eq!(store.active_semester_on(date("2024-12-15")).unwrap().id, "sem1");
        assert_eq!(store.active_semester_on(date("2030-01-01")).unwrap().id, "sem1");
    }

    #[test]
    fn unknown_subject_reports_not_found_without_change() {
        let kv = MemoryKvRepository::new();
        let mut store = AttendanceStore::open(&kv).unwrap();

        let err = store.update_subject_periods("sem1", "nope", 12).unwrap_err();
        assert!(matches!(err, StoreError::SubjectNotFound { .. }));
        assert!(kv.get("semesters").unwrap().is_none());
    }
}
