#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use quick_money::{
    core::{
        ledger_manager::LedgerManager,
        time::{Clock, FixedClock},
    },
    storage::JsonFileStore,
};
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// A fresh data directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn clock_on(day: NaiveDate) -> Arc<dyn Clock> {
    Arc::new(FixedClock::at(day, 10, 0).expect("valid local time"))
}

/// Opens `user`'s session on a file store rooted at `base`.
pub fn open_session(base: &Path, user: &str, day: NaiveDate) -> LedgerManager {
    let store = JsonFileStore::new(Some(base.to_path_buf())).expect("create json store");
    LedgerManager::open(Box::new(store), user, clock_on(day)).expect("open session")
}
