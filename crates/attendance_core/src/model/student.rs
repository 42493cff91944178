//! Student and faculty reference records.
//!
//! Both rosters are fixed at build time and never edited at runtime.

use serde::{Deserialize, Serialize};

/// Roster entry for one enrolled student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
    pub roll_number: String,
}

/// Faculty member that can be assigned to a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Faculty {
    pub id: String,
    pub name: String,
    pub email: String,
}
