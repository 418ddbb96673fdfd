//! Ledger state, registry records, and the recurring-template model.

pub mod account;
pub mod category;
pub mod defaults;
#[allow(clippy::module_inception)]
pub mod ledger;
pub mod recurring;
pub mod transaction;

pub use account::{Account, AccountPatch};
pub use category::{Category, CategoryKind, CategoryPatch};
pub use ledger::{Ledger, UNKNOWN_LABEL};
pub use recurring::{Frequency, RecurringPatch, RecurringTemplate, AUTO_NOTE_PREFIX};
pub use transaction::{BalanceLeg, Transaction, TransactionKind, TransactionPatch};
