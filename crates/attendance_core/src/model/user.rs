//! Authenticated user model.
//!
//! # Invariants
//! - `User` never carries a password; credentials stay inside the roster.

use serde::{Deserialize, Serialize};

/// Access role for dashboard gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Marks attendance and configures periods for assigned subjects.
    Faculty,
    /// Creates and edits semesters, reads institution-wide metrics.
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Faculty => "faculty",
            Self::Admin => "admin",
        }
    }
}

/// Sanitized session user, persisted under the `currentUser` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

/// Roster credential entry. Only used for the mock login match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Credential {
    pub id: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub name: &'static str,
    pub role: Role,
}

impl Credential {
    /// Exact, case-sensitive match on both fields.
    pub fn matches(&self, email: &str, password: &str) -> bool {
        self.email == email && self.password == password
    }

    /// Drops the password and returns the session-safe projection.
    pub fn to_user(&self) -> User {
        User {
            id: self.id.to_string(),
            email: self.email.to_string(),
            name: self.name.to_string(),
            role: self.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Credential, Role};

    const SAMPLE: Credential = Credential {
        id: "a1",
        email: "admin@college.edu",
        password: "admin123",
        name: "Admin User",
        role: Role::Admin,
    };

    #[test]
    fn matches_is_case_sensitive() {
        assert!(SAMPLE.matches("admin@college.edu", "admin123"));
        assert!(!SAMPLE.matches("Admin@college.edu", "admin123"));
        assert!(!SAMPLE.matches("admin@college.edu", "ADMIN123"));
    }

    #[test]
    fn sanitized_user_serializes_without_password() {
        let json = serde_json::to_string(&SAMPLE.to_user()).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
