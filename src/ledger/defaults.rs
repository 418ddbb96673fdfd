//! Built-in registries used for first launch and for recovering from missing state.

use super::{Account, Category, CategoryKind};

const EXPENSE_CATEGORIES: &[(&str, &str, &str, &str)] = &[
    ("food", "Food", "🍱", "#FF6384"),
    ("transport", "Transport", "🚌", "#36A2EB"),
    ("shopping", "Shopping", "🛍️", "#FFCE56"),
    ("entertainment", "Entertainment", "🎮", "#4BC0C0"),
    ("daily", "Daily Needs", "🧻", "#9966FF"),
    ("medical", "Medical", "💊", "#FF9F40"),
    ("housing", "Rent", "🏠", "#C9CBCF"),
    ("other_exp", "Other", "✨", "#4D5360"),
];

const INCOME_CATEGORIES: &[(&str, &str, &str, &str)] = &[
    ("salary", "Salary", "💰", "#32D74B"),
    ("bonus", "Bonus", "🧧", "#FFD700"),
    ("investment", "Investment", "📈", "#5AC8FA"),
    ("part_time", "Part-time", "🛵", "#FF2D55"),
    ("other_inc", "Other", "🧧", "#AF52DE"),
];

/// Expense categories followed by income categories, in display order.
pub fn default_categories() -> Vec<Category> {
    let expense = EXPENSE_CATEGORIES
        .iter()
        .map(|(id, label, icon, color)| {
            Category::new(*id, *label, CategoryKind::Expense).with_icon(*icon, *color)
        });
    let income = INCOME_CATEGORIES
        .iter()
        .map(|(id, label, icon, color)| {
            Category::new(*id, *label, CategoryKind::Income).with_icon(*icon, *color)
        });
    expense.chain(income).collect()
}

pub fn default_accounts() -> Vec<Account> {
    vec![
        Account::new("acc_1", "Current Account", 50_000.0)
            .with_kind("CURRENT ACCOUNT")
            .with_number("223012419")
            .with_holder("MIAO MENG TA"),
        Account::new("acc_2", "Cash", 5_000.0)
            .with_kind("CASH")
            .with_number("----"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn default_category_ids_are_unique() {
        let categories = default_categories();
        let ids: HashSet<_> = categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), categories.len());
        assert_eq!(categories.len(), 13);
    }

    #[test]
    fn default_accounts_start_without_drift() {
        for account in default_accounts() {
            assert_eq!(account.opening_balance, Some(account.balance));
        }
    }

    #[test]
    fn current_account_carries_holder_name() {
        let accounts = default_accounts();
        assert_eq!(accounts[0].holder_name.as_deref(), Some("MIAO MENG TA"));
        assert_eq!(accounts[1].holder_name, None);
    }
}
