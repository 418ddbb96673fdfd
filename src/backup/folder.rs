//! Capability-gated access to a user-chosen backup folder.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use serde::{Deserialize, Serialize};

use super::{BackupError, BackupResult};
use crate::storage::json_backend::write_atomic;

/// Persistable reference to the folder the user granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderHandle {
    pub name: String,
    pub path: PathBuf,
}

impl FolderHandle {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { name, path }
    }
}

/// Result of re-checking a stored grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied,
    Unsupported,
}

pub trait FolderProvider: Send + Sync {
    /// Whether folder handles exist at all on this platform.
    fn is_supported(&self) -> bool;
    fn ensure_access(&self, handle: &FolderHandle) -> Access;
    fn entries(&self, handle: &FolderHandle) -> BackupResult<Vec<String>>;
    fn write_file(&self, handle: &FolderHandle, name: &str, contents: &str) -> BackupResult<()>;
    fn read_file(&self, handle: &FolderHandle, name: &str) -> BackupResult<String>;
    fn remove_file(&self, handle: &FolderHandle, name: &str) -> BackupResult<()>;
}

/// Keeps the chosen folder across sessions.
pub trait HandleStore: Send + Sync {
    fn load_handle(&self) -> BackupResult<Option<FolderHandle>>;
    fn save_handle(&self, handle: &FolderHandle) -> BackupResult<()>;
    fn clear_handle(&self) -> BackupResult<()>;
}

/// Interactive choosers. `None` means the user dismissed the dialog.
pub trait Picker {
    fn pick_folder(&self) -> Option<FolderHandle>;
    fn pick_file(&self) -> Option<PathBuf>;
}

/// Folder provider over the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsFolderProvider;

impl FsFolderProvider {
    fn file_path(handle: &FolderHandle, name: &str) -> BackupResult<PathBuf> {
        let plain = Path::new(name)
            .file_name()
            .map(|file| file == name)
            .unwrap_or(false);
        if !plain {
            return Err(BackupError::NotFound(name.to_string()));
        }
        Ok(handle.path.join(name))
    }
}

impl FolderProvider for FsFolderProvider {
    fn is_supported(&self) -> bool {
        true
    }

    fn ensure_access(&self, handle: &FolderHandle) -> Access {
        match fs::metadata(&handle.path) {
            Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => Access::Granted,
            _ => Access::Denied,
        }
    }

    fn entries(&self, handle: &FolderHandle) -> BackupResult<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&handle.path)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn write_file(&self, handle: &FolderHandle, name: &str, contents: &str) -> BackupResult<()> {
        let path = Self::file_path(handle, name)?;
        write_atomic(&path, contents)?;
        Ok(())
    }

    fn read_file(&self, handle: &FolderHandle, name: &str) -> BackupResult<String> {
        let path = Self::file_path(handle, name)?;
        fs::read_to_string(&path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => BackupError::NotFound(name.to_string()),
            _ => BackupError::Io(err),
        })
    }

    fn remove_file(&self, handle: &FolderHandle, name: &str) -> BackupResult<()> {
        let path = Self::file_path(handle, name)?;
        fs::remove_file(path)?;
        Ok(())
    }
}

/// In-process handle store for tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryHandleStore {
    handle: Mutex<Option<FolderHandle>>,
}

impl MemoryHandleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_handle(handle: FolderHandle) -> Self {
        Self {
            handle: Mutex::new(Some(handle)),
        }
    }

    fn slot(&self) -> BackupResult<std::sync::MutexGuard<'_, Option<FolderHandle>>> {
        self.handle
            .lock()
            .map_err(|_| BackupError::Storage("handle store lock poisoned".into()))
    }
}

impl HandleStore for MemoryHandleStore {
    fn load_handle(&self) -> BackupResult<Option<FolderHandle>> {
        Ok(self.slot()?.clone())
    }

    fn save_handle(&self, handle: &FolderHandle) -> BackupResult<()> {
        *self.slot()? = Some(handle.clone());
        Ok(())
    }

    fn clear_handle(&self) -> BackupResult<()> {
        *self.slot()? = None;
        Ok(())
    }
}
