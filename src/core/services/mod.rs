pub mod account_service;
pub mod category_service;
pub mod recurring_service;
pub mod transaction_service;

pub use account_service::AccountService;
pub use category_service::CategoryService;
pub use recurring_service::RecurringService;
pub use transaction_service::TransactionService;
