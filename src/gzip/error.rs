use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Error number reported for I/O failures.
pub const Z_ERRNO: i32 = -1;
/// Invalid engine state or parameters.
pub const Z_STREAM_ERROR: i32 = -2;
/// Corrupt or non-gzip input data.
pub const Z_DATA_ERROR: i32 = -3;
/// Decoding could not make progress.
pub const Z_BUF_ERROR: i32 = -5;

/// Broad category of a [`GzError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    FileOpen,
    Read,
    EngineInit,
    Format,
    Output,
}

/// Failure while scanning gzip members.
///
/// Every variant is fatal: scanning stops at the first error and the
/// binary exits with [`GzError::status_code`].
#[derive(Error, Debug)]
pub enum GzError {
    #[error("unable to open file {}", .path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("error reading file at offset {offset}")]
    Read {
        offset: u64,
        #[source]
        source: io::Error,
    },
    #[error("issue reading file (no data) at offset {offset}")]
    EmptyRead { offset: u64 },
    #[error("inflate engine initialization failed: {0}")]
    EngineInit(&'static str),
    #[error("inflate returned error: {code}, msg: {msg}")]
    Format { code: i32, msg: String },
    #[error("error writing report")]
    Output(#[from] io::Error),
}

impl GzError {
    pub(crate) fn format(code: i32, msg: impl Into<String>) -> Self {
        GzError::Format {
            code,
            msg: msg.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            GzError::FileOpen { .. } => ErrorKind::FileOpen,
            GzError::Read { .. } | GzError::EmptyRead { .. } => ErrorKind::Read,
            GzError::EngineInit(_) => ErrorKind::EngineInit,
            GzError::Format { .. } => ErrorKind::Format,
            GzError::Output(_) => ErrorKind::Output,
        }
    }

    /// Process exit status for this error.
    pub fn status_code(&self) -> i32 {
        match self {
            GzError::FileOpen { .. } => 1,
            GzError::Read { .. } | GzError::Output(_) => Z_ERRNO,
            GzError::EmptyRead { .. } => Z_DATA_ERROR,
            GzError::EngineInit(_) => Z_STREAM_ERROR,
            GzError::Format { code, .. } => *code,
        }
    }
}
