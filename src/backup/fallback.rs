use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::warn;

use super::{BackupError, BackupResult};
use crate::core::utils::{ensure_dir, PathResolver};
use crate::storage::json_backend::write_atomic;

/// Download-style target used when no folder handle is available.
#[derive(Debug, Clone)]
pub struct DownloadSink {
    dir: PathBuf,
}

impl DownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The platform downloads directory, or `<base>/downloads` when there is none.
    pub fn default_in(base: &Path) -> Self {
        Self::new(PathResolver::downloads_dir_or(base))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write(&self, file_name: &str, contents: &str) -> BackupResult<PathBuf> {
        ensure_dir(&self.dir)?;
        let path = self.dir.join(file_name);
        if path.exists() {
            warn!(path = %path.display(), "replacing a backup written earlier in the same minute");
        }
        write_atomic(&path, contents)?;
        Ok(path)
    }

    /// Reads a file the user picked by hand.
    pub fn read_picked(path: &Path) -> BackupResult<String> {
        fs::read_to_string(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => BackupError::NotFound(path.display().to_string()),
            _ => BackupError::Io(err),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_creates_the_directory() {
        let temp = TempDir::new().expect("temp dir");
        let sink = DownloadSink::new(temp.path().join("downloads"));
        let path = sink.write("quick-money-backup-20250101-0000.json", "{}").unwrap();
        assert_eq!(DownloadSink::read_picked(&path).unwrap(), "{}");
    }

    #[test]
    fn same_minute_write_replaces_the_earlier_file() {
        let temp = TempDir::new().expect("temp dir");
        let sink = DownloadSink::new(temp.path().join("downloads"));
        let name = "quick-money-backup-20250101-0000.json";
        let first = sink.write(name, "{\"version\":1}").unwrap();
        let second = sink.write(name, "{\"version\":2}").unwrap();
        assert_eq!(first, second);
        assert_eq!(DownloadSink::read_picked(&second).unwrap(), "{\"version\":2}");
        assert_eq!(fs::read_dir(sink.dir()).unwrap().count(), 1);
    }

    #[test]
    fn missing_pick_is_not_found() {
        let temp = TempDir::new().expect("temp dir");
        let err = DownloadSink::read_picked(&temp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, BackupError::NotFound(_)));
    }
}
