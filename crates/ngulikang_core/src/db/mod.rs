//! Connection lifecycle for the fixture database.
//!
//! # Responsibility
//! - Acquire a SQLite handle, configure it and bring its schema up to date.
//! - Report which stage of acquisition failed.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - A handle is only returned once every stage succeeded.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to acquire, prepare or release the fixture database.
///
/// Every variant means the store is not usable; statement failures on a
/// healthy connection are reported by the store layer instead.
#[derive(Debug)]
pub enum DbError {
    /// The database file or in-memory handle could not be opened.
    Open {
        target: String,
        source: rusqlite::Error,
    },
    /// Connection pragmas were rejected.
    Configure(rusqlite::Error),
    /// `PRAGMA user_version` could not be read.
    SchemaVersion(rusqlite::Error),
    /// Applying migration `version` failed; nothing from the batch was kept.
    Migration {
        version: u32,
        source: rusqlite::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// The connection could not be closed cleanly.
    Close(rusqlite::Error),
}

impl DbError {
    fn sqlite_source(&self) -> Option<&rusqlite::Error> {
        match self {
            Self::Open { source, .. } | Self::Migration { source, .. } => Some(source),
            Self::Configure(err) | Self::SchemaVersion(err) | Self::Close(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open { target, source } => write!(f, "cannot open `{target}`: {source}"),
            Self::Configure(err) => write!(f, "cannot configure connection: {err}"),
            Self::SchemaVersion(err) => write!(f, "cannot read schema version: {err}"),
            Self::Migration { version, source } => {
                write!(f, "migration {version} failed: {source}")
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::Close(err) => write!(f, "cannot close connection: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.sqlite_source().map(|err| err as &(dyn Error + 'static))
    }
}
