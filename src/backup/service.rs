//! Backup orchestration: folder selection, writes, listing and confirmed restore.

use std::path::PathBuf;

use tracing::{info, warn};

use super::{
    fallback::DownloadSink,
    folder::{Access, FolderHandle, FolderProvider, HandleStore, Picker},
    naming::{backup_file_name, is_backup_file_name, sort_newest_first},
    snapshot::BackupSnapshot,
    BackupError, BackupResult,
};
use crate::core::time::Clock;
use crate::ledger::Ledger;
use crate::storage::Collection;

/// Non-error result of a step the user may abandon.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Cancelled => None,
        }
    }
}

/// Where the backup subsystem currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupState {
    /// Folder handles are unavailable; only downloads work.
    Unsupported,
    Unconfigured,
    Configured(FolderHandle),
    /// A folder was saved but its grant is gone.
    Degraded(FolderHandle),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupLocation {
    Folder { folder: String },
    Download { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupReceipt {
    pub file_name: String,
    pub location: BackupLocation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub restored: Vec<Collection>,
    pub kept: Vec<Collection>,
}

/// Last gate before a restore overwrites the ledger.
pub trait ConfirmRestore {
    fn confirm(&self, snapshot: &BackupSnapshot) -> bool;
}

impl<F> ConfirmRestore for F
where
    F: Fn(&BackupSnapshot) -> bool,
{
    fn confirm(&self, snapshot: &BackupSnapshot) -> bool {
        self(snapshot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Info,
}

/// User-facing line summarizing a backup operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupStatus {
    pub kind: StatusKind,
    pub message: String,
}

impl BackupStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            message: message.into(),
        }
    }

    /// Maps every outcome, including failures, to a status line.
    pub fn from_result<T>(
        result: &BackupResult<Outcome<T>>,
        describe: impl FnOnce(&T) -> String,
    ) -> Self {
        match result {
            Ok(Outcome::Completed(value)) => Self::success(describe(value)),
            Ok(Outcome::Cancelled) => Self::info("Cancelled"),
            Err(err) => Self::from_error(err),
        }
    }

    pub fn from_error(err: &BackupError) -> Self {
        Self::error(format!("[{}] {}", err.code(), err))
    }
}

pub struct BackupService {
    provider: Box<dyn FolderProvider>,
    handles: Box<dyn HandleStore>,
    downloads: DownloadSink,
    prefix: String,
    retention: Option<usize>,
}

impl BackupService {
    pub fn new(
        provider: Box<dyn FolderProvider>,
        handles: Box<dyn HandleStore>,
        downloads: DownloadSink,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            handles,
            downloads,
            prefix: prefix.into(),
            retention: None,
        }
    }

    /// Keep at most `keep` backups in the folder after each write.
    pub fn with_retention(mut self, keep: Option<usize>) -> Self {
        self.retention = keep.map(|keep| keep.max(1));
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn state(&self) -> BackupResult<BackupState> {
        if !self.provider.is_supported() {
            return Ok(BackupState::Unsupported);
        }
        let state = match self.handles.load_handle()? {
            None => BackupState::Unconfigured,
            Some(handle) => match self.provider.ensure_access(&handle) {
                Access::Granted => BackupState::Configured(handle),
                Access::Denied => BackupState::Degraded(handle),
                Access::Unsupported => BackupState::Unsupported,
            },
        };
        Ok(state)
    }

    /// Lets the user choose a folder and remembers it. Returns the folder name.
    pub fn pick_folder(&self, picker: &dyn Picker) -> BackupResult<Outcome<String>> {
        if !self.provider.is_supported() {
            return Err(BackupError::NotSupported);
        }
        let handle = match picker.pick_folder() {
            Some(handle) => handle,
            None => return Ok(Outcome::Cancelled),
        };
        match self.provider.ensure_access(&handle) {
            Access::Granted => {}
            Access::Denied => return Err(BackupError::PermissionDenied),
            Access::Unsupported => return Err(BackupError::NotSupported),
        }
        self.handles.save_handle(&handle)?;
        info!(folder = %handle.name, "backup folder selected");
        Ok(Outcome::Completed(handle.name))
    }

    /// Name of the remembered folder, without re-checking its grant.
    pub fn saved_folder_name(&self) -> BackupResult<Option<String>> {
        Ok(self.handles.load_handle()?.map(|handle| handle.name))
    }

    pub fn clear_folder(&self) -> BackupResult<()> {
        self.handles.clear_handle()?;
        info!("backup folder cleared");
        Ok(())
    }

    /// Writes a snapshot to the configured folder, or to the download
    /// location when folders are unsupported or none was chosen.
    pub fn backup(&self, ledger: &Ledger, clock: &dyn Clock) -> BackupResult<BackupReceipt> {
        let folder_mode =
            self.provider.is_supported() && self.handles.load_handle()?.is_some();
        if folder_mode {
            self.backup_to_folder(ledger, clock)
        } else {
            self.download(ledger, clock)
        }
    }

    pub fn backup_to_folder(&self, ledger: &Ledger, clock: &dyn Clock) -> BackupResult<BackupReceipt> {
        let handle = self.granted_folder()?;
        let (file_name, json) = self.render(ledger, clock)?;
        self.provider.write_file(&handle, &file_name, &json)?;
        info!(folder = %handle.name, file = %file_name, "backup written");
        self.prune(&handle)?;
        Ok(BackupReceipt {
            file_name,
            location: BackupLocation::Folder {
                folder: handle.name,
            },
        })
    }

    pub fn download(&self, ledger: &Ledger, clock: &dyn Clock) -> BackupResult<BackupReceipt> {
        let (file_name, json) = self.render(ledger, clock)?;
        let path = self.downloads.write(&file_name, &json)?;
        info!(path = %path.display(), "backup downloaded");
        Ok(BackupReceipt {
            file_name,
            location: BackupLocation::Download { path },
        })
    }

    /// Backup files in the folder, newest first.
    pub fn list(&self) -> BackupResult<Vec<String>> {
        let handle = self.granted_folder()?;
        let mut names: Vec<String> = self
            .provider
            .entries(&handle)?
            .into_iter()
            .filter(|name| is_backup_file_name(&self.prefix, name))
            .collect();
        sort_newest_first(&mut names);
        Ok(names)
    }

    pub fn read(&self, file_name: &str) -> BackupResult<BackupSnapshot> {
        let handle = self.granted_folder()?;
        let text = self.provider.read_file(&handle, file_name)?;
        BackupSnapshot::parse(&text)
    }

    /// Reads a snapshot from a file the user picks, for download-mode restores.
    pub fn read_picked(&self, picker: &dyn Picker) -> BackupResult<Outcome<BackupSnapshot>> {
        let path = match picker.pick_file() {
            Some(path) => path,
            None => return Ok(Outcome::Cancelled),
        };
        let text = DownloadSink::read_picked(&path)?;
        BackupSnapshot::parse(&text).map(Outcome::Completed)
    }

    /// Overwrites `ledger` with the snapshot once the user confirms.
    pub fn restore(
        &self,
        ledger: &mut Ledger,
        snapshot: &BackupSnapshot,
        confirm: &dyn ConfirmRestore,
    ) -> Outcome<RestoreSummary> {
        if !confirm.confirm(snapshot) {
            info!("restore declined");
            return Outcome::Cancelled;
        }
        snapshot.apply_to(ledger);
        let restored = snapshot.present();
        let kept = Collection::ALL
            .into_iter()
            .filter(|collection| !restored.contains(collection))
            .collect();
        info!(collections = restored.len(), "ledger restored from backup");
        Outcome::Completed(RestoreSummary { restored, kept })
    }

    /// The saved folder, after the capability and grant checks.
    fn granted_folder(&self) -> BackupResult<FolderHandle> {
        if !self.provider.is_supported() {
            return Err(BackupError::NotSupported);
        }
        let handle = self.handles.load_handle()?.ok_or(BackupError::NoFolder)?;
        match self.provider.ensure_access(&handle) {
            Access::Granted => Ok(handle),
            Access::Denied => {
                warn!(folder = %handle.name, "backup folder permission denied");
                Err(BackupError::PermissionDenied)
            }
            Access::Unsupported => Err(BackupError::NotSupported),
        }
    }

    fn render(&self, ledger: &Ledger, clock: &dyn Clock) -> BackupResult<(String, String)> {
        let file_name = backup_file_name(&self.prefix, &clock.now());
        let json = BackupSnapshot::capture(ledger, clock.now_utc()).to_json()?;
        Ok((file_name, json))
    }

    fn prune(&self, handle: &FolderHandle) -> BackupResult<()> {
        let Some(keep) = self.retention else {
            return Ok(());
        };
        let mut names: Vec<String> = self
            .provider
            .entries(handle)?
            .into_iter()
            .filter(|name| is_backup_file_name(&self.prefix, name))
            .collect();
        sort_newest_first(&mut names);
        for stale in names.iter().skip(keep) {
            self.provider.remove_file(handle, stale)?;
            info!(file = %stale, "old backup pruned");
        }
        Ok(())
    }
}
