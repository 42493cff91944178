//! Typed access to persisted application state.
//!
//! # Responsibility
//! - Map the `currentUser`, `semesters` and `attendance` keys to domain types.
//! - Own the payload version tag stored under `schemaVersion`.
//!
//! # Invariants
//! - Untagged state is payload version 0 and is stamped on `prepare`.
//! - State tagged newer than [`STATE_VERSION`] is rejected, never rewritten.
//! - Read paths reject undecodable payloads instead of masking them.

use crate::model::attendance::AttendanceRecord;
use crate::model::semester::Semester;
use crate::model::user::User;
use crate::repo::kv_repo::{KvRepository, RepoError};
use log::{info, warn};
use serde::de::DeserializeOwned;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const CURRENT_USER_KEY: &str = "currentUser";
pub const SEMESTERS_KEY: &str = "semesters";
pub const ATTENDANCE_KEY: &str = "attendance";
pub const STATE_VERSION_KEY: &str = "schemaVersion";

/// Payload version written by this build.
pub const STATE_VERSION: u32 = 1;

const DATA_KEYS: [&str; 3] = [CURRENT_USER_KEY, SEMESTERS_KEY, ATTENDANCE_KEY];

pub type StateResult<T> = Result<T, StateError>;

#[derive(Debug)]
pub enum StateError {
    Repo(RepoError),
    Corrupt {
        key: &'static str,
        source: serde_json::Error,
    },
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
    UnsupportedVersion {
        found: u32,
        latest_supported: u32,
    },
    InvalidVersionTag(String),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Corrupt { key, source } => {
                write!(f, "persisted `{key}` payload is unreadable: {source}")
            }
            Self::Encode { key, source } => write!(f, "failed to encode `{key}`: {source}"),
            Self::UnsupportedVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "persisted state version {found} is newer than supported {latest_supported}"
            ),
            Self::InvalidVersionTag(value) => write!(f, "invalid state version tag `{value}`"),
        }
    }
}

impl Error for StateError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Corrupt { source, .. } | Self::Encode { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RepoError> for StateError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Typed view over a key-value repository.
pub struct StateRepository<R: KvRepository> {
    repo: R,
}

impl<R: KvRepository> StateRepository<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Checks the payload version and migrates older state in place.
    ///
    /// Returns the version found before migration.
    pub fn prepare(&self) -> StateResult<u32> {
        let found = self.check_version()?;
        self.migrate_from(found)?;
        Ok(found)
    }

    /// Reads the payload version and rejects state newer than this build.
    pub fn check_version(&self) -> StateResult<u32> {
        let found = self.stored_version()?;
        if found > STATE_VERSION {
            return Err(StateError::UnsupportedVersion {
                found,
                latest_supported: STATE_VERSION,
            });
        }
        Ok(found)
    }

    /// Stamps the current tag over state found at `found`.
    ///
    /// Only the tag write can fail here; data keys are left untouched.
    pub fn migrate_from(&self, found: u32) -> StateResult<()> {
        if found >= STATE_VERSION {
            return Ok(());
        }

        let legacy = self.has_data()?;
        // v0 -> v1 keeps the payload shape; only the tag is new.
        self.repo
            .set(STATE_VERSION_KEY, &STATE_VERSION.to_string())?;
        if legacy {
            info!(
                "event=state_migrate module=repo status=ok from_version={} to_version={}",
                found, STATE_VERSION
            );
        }
        Ok(())
    }

    /// Returns the stored payload version, 0 when untagged.
    pub fn stored_version(&self) -> StateResult<u32> {
        match self.repo.get(STATE_VERSION_KEY)? {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| StateError::InvalidVersionTag(raw)),
            None => Ok(0),
        }
    }

    /// Returns whether any data key holds a value.
    pub fn has_data(&self) -> StateResult<bool> {
        for key in DATA_KEYS {
            if self.repo.get(key)?.is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    pub fn load_semesters(&self) -> StateResult<Option<Vec<Semester>>> {
        self.load_json(SEMESTERS_KEY)
    }

    pub fn load_attendance(&self) -> StateResult<Option<Vec<AttendanceRecord>>> {
        self.load_json(ATTENDANCE_KEY)
    }

    pub fn load_session(&self) -> StateResult<Option<User>> {
        self.load_json(CURRENT_USER_KEY)
    }

    /// Writes both collections and the version tag as one unit.
    pub fn save_collections(
        &self,
        semesters: &[Semester],
        attendance: &[AttendanceRecord],
    ) -> StateResult<()> {
        let entries = [
            (SEMESTERS_KEY, encode(SEMESTERS_KEY, &semesters)?),
            (ATTENDANCE_KEY, encode(ATTENDANCE_KEY, &attendance)?),
            (STATE_VERSION_KEY, STATE_VERSION.to_string()),
        ];
        self.repo.set_many(&entries)?;
        Ok(())
    }

    pub fn save_session(&self, user: Option<&User>) -> StateResult<()> {
        match user {
            Some(user) => {
                let encoded = encode(CURRENT_USER_KEY, user)?;
                self.repo.set(CURRENT_USER_KEY, &encoded)?;
            }
            None => self.repo.remove(CURRENT_USER_KEY)?,
        }
        Ok(())
    }

    fn load_json<T: DeserializeOwned>(&self, key: &'static str) -> StateResult<Option<T>> {
        let Some(raw) = self.repo.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(source) => {
                warn!(
                    "event=state_load module=repo status=error key={} error_code=state_corrupt",
                    key
                );
                Err(StateError::Corrupt { key, source })
            }
        }
    }
}

fn encode<T: serde::Serialize + ?Sized>(key: &'static str, value: &T) -> StateResult<String> {
    serde_json::to_string(value).map_err(|source| StateError::Encode { key, source })
}
