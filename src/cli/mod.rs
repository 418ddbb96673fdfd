//! Thin command-line consumer of the ledger session and backup service.

mod commands;
pub mod output;
pub mod view;

pub use commands::{run_cli, CliError};
pub use view::{TransactionRow, View};
