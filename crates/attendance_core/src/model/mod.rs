//! Attendance domain model.
//!
//! # Responsibility
//! - Define the canonical records shared by identity, attendance and metrics.
//! - Keep serialized field names aligned with the persisted camelCase shape.
//!
//! # Invariants
//! - Subjects exist only inside their owning `Semester`.
//! - At most one `AttendanceRecord` exists per `RecordKey`.
//! - `Subject::total_periods == 0` means periods are not configured yet.

pub mod attendance;
pub mod semester;
pub mod student;
pub mod user;
