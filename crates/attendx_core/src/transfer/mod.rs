//! Export/import adapters.
//!
//! # Responsibility
//! - Serialize the whole store to a portable JSON snapshot and restore it.
//! - Render per-student statistics as CSV.
//! - Derive the file names used when the payload is handed to the platform.
//!
//! The adapters only produce and consume strings; writing files or opening a
//! share dialog is left to the caller.

use crate::repo::error::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod csv_report;
pub mod snapshot;

/// Failure while exporting or importing a snapshot.
#[derive(Debug)]
pub enum TransferError {
    /// Input is not valid JSON or does not match the snapshot shape.
    MalformedPayload(serde_json::Error),
    /// Input is a JSON object without any collection key.
    EmptyPayload,
    /// Store contents could not be serialized.
    Serialize(serde_json::Error),
    /// Reading or replacing collections failed.
    Repo(RepoError),
}

impl Display for TransferError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedPayload(err) => write!(f, "malformed import payload: {err}"),
            Self::EmptyPayload => write!(
                f,
                "import payload contains none of centers, students, attendance, settings"
            ),
            Self::Serialize(err) => write!(f, "failed to serialize snapshot: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TransferError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MalformedPayload(err) | Self::Serialize(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::EmptyPayload => None,
        }
    }
}

impl From<RepoError> for TransferError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for TransferError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(value.into())
    }
}
