use std::fmt;

use serde::{Deserialize, Serialize};

/// Categorises ledger activity for budgeting and reporting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    #[serde(default)]
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(rename = "type")]
    pub kind: CategoryKind,
    /// Monthly spending limit; only meaningful for expense categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
}

impl Category {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            icon: String::new(),
            color: String::new(),
            kind,
            budget: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>, color: impl Into<String>) -> Self {
        self.icon = icon.into();
        self.color = color.into();
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    /// The budget when it applies, i.e. set on an expense category.
    pub fn effective_budget(&self) -> Option<f64> {
        match self.kind {
            CategoryKind::Expense => self.budget,
            CategoryKind::Income => None,
        }
    }
}

/// Supported category types.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CategoryKind::Expense => "Expense",
            CategoryKind::Income => "Income",
        };
        f.write_str(label)
    }
}

/// Partial update for [`Category`].
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub label: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub kind: Option<CategoryKind>,
    pub budget: Option<Option<f64>>,
}

impl CategoryPatch {
    pub fn apply(&self, category: &mut Category) {
        if let Some(label) = &self.label {
            category.label = label.clone();
        }
        if let Some(icon) = &self.icon {
            category.icon = icon.clone();
        }
        if let Some(color) = &self.color {
            category.color = color.clone();
        }
        if let Some(kind) = self.kind {
            category.kind = kind;
        }
        if let Some(budget) = self.budget {
            category.budget = budget;
        }
    }
}
