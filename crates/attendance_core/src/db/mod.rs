//! SQLite bootstrap for the attendance key-value state.
//!
//! # Responsibility
//! - Open the database file that backs `kv_entries`.
//! - Bring the table layout up to date before any store touches it.
//!
//! # Invariants
//! - Layout version lives in `PRAGMA user_version`; payload version lives in
//!   the `schemaVersion` entry and is owned by `repo::state_repo`.
//! - A connection handed out by this module always has `kv_entries`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The database file could not be opened at all.
    Open {
        path: PathBuf,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
    /// File was written by a build with a newer `kv_entries` layout.
    NewerTableLayout { found: u32, latest_supported: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { path, source } => write!(
                f,
                "cannot open attendance database `{}`: {source}",
                path.display()
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::NewerTableLayout {
                found,
                latest_supported,
            } => write!(
                f,
                "kv_entries layout version {found} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Sqlite(source) => Some(source),
            Self::NewerTableLayout { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
