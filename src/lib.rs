#![doc(test(attr(deny(warnings))))]

//! Quick Money core: a personal income/expense ledger with derived reports,
//! recurring transactions and folder-based backup/restore.

pub mod backup;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod errors;
pub mod export;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(
            "Quick Money core initialized ({}).",
            utils::build_info::current().summary()
        );
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
        super::init();
    }
}
