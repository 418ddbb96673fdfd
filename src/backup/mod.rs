//! Whole-ledger snapshots written to a user-chosen folder or a download fallback.

pub mod fallback;
pub mod folder;
pub mod naming;
pub mod service;
pub mod snapshot;

use thiserror::Error;

use crate::errors::LedgerError;

/// Failure taxonomy of the backup subsystem.
#[derive(Debug, Error)]
pub enum BackupError {
    #[error("folder backups are not supported on this platform")]
    NotSupported,
    #[error("no backup folder has been selected")]
    NoFolder,
    #[error("access to the backup folder was revoked; select it again")]
    PermissionDenied,
    #[error("backup could not be parsed: {0}")]
    Parse(String),
    #[error("backup version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("backup file not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage error: {0}")]
    Storage(String),
}

impl BackupError {
    /// Stable machine-readable code for the failure.
    pub fn code(&self) -> &'static str {
        match self {
            BackupError::NotSupported => "NOT_SUPPORTED",
            BackupError::NoFolder => "NO_FOLDER",
            BackupError::PermissionDenied => "PERMISSION_DENIED",
            BackupError::Parse(_) => "PARSE_ERROR",
            BackupError::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            BackupError::NotFound(_) => "NOT_FOUND",
            BackupError::Io(_) => "IO_ERROR",
            BackupError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

impl From<LedgerError> for BackupError {
    fn from(err: LedgerError) -> Self {
        BackupError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        BackupError::Parse(err.to_string())
    }
}

pub type BackupResult<T> = std::result::Result<T, BackupError>;

pub use fallback::DownloadSink;
pub use folder::{
    Access, FolderHandle, FolderProvider, FsFolderProvider, HandleStore, MemoryHandleStore, Picker,
};
pub use naming::{backup_file_name, is_backup_file_name, sort_newest_first, DEFAULT_PREFIX};
pub use service::{
    BackupLocation, BackupReceipt, BackupService, BackupState, BackupStatus, ConfirmRestore,
    Outcome, RestoreSummary, StatusKind,
};
pub use snapshot::{BackupSnapshot, SNAPSHOT_VERSION};
