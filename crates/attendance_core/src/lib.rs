//! Core domain logic for attendance tracking.
//! This crate is the single source of truth for attendance invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::attendance::{AttendanceRecord, AttendanceStatus, RecordKey};
pub use model::semester::{
    NewSemester, Semester, SemesterPatch, SemesterValidationError, Subject, SubjectAssignment,
};
pub use model::student::{Faculty, Student};
pub use model::user::{Role, User};
pub use repo::kv_repo::{
    KvRepository, MemoryKvRepository, RepoError, RepoResult, SqliteKvRepository,
};
pub use repo::state_repo::{StateError, StateRepository, STATE_VERSION};
pub use service::attendance_service::{
    AttendanceStore, MarkOutcome, StoreError, StoreEvent, StoreResult,
};
pub use service::identity_service::{
    IdentityError, IdentityEvent, IdentityResult, IdentityStore,
};
pub use service::metrics::{
    LowAttendanceEntry, SemesterOverview, SubjectAttendance, LOW_ATTENDANCE_THRESHOLD,
};
pub use service::notify::SubscriptionId;
pub use service::sheet::AttendanceSheet;
pub use service::PersistenceMode;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
