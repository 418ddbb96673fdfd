use uuid::Uuid;

use crate::errors::{LedgerError, Result};
use crate::ledger::{Category, CategoryKind, CategoryPatch, Ledger};

pub struct CategoryService;

impl CategoryService {
    pub fn add(ledger: &mut Ledger, mut category: Category) -> Result<String> {
        Self::validate(&category)?;
        if category.id.trim().is_empty() {
            category.id = Uuid::new_v4().to_string();
        }
        if ledger.category(&category.id).is_some() {
            return Err(LedgerError::Duplicate(category.id));
        }
        let id = category.id.clone();
        ledger.categories.push(category);
        Ok(id)
    }

    pub fn update(ledger: &mut Ledger, id: &str, patch: &CategoryPatch) -> Result<()> {
        let category = ledger
            .category_mut(id)
            .ok_or_else(|| LedgerError::CategoryNotFound(id.to_string()))?;
        let mut candidate = category.clone();
        patch.apply(&mut candidate);
        Self::validate(&candidate)?;
        *category = candidate;
        Ok(())
    }

    /// Sets or clears the monthly budget.
    pub fn set_budget(ledger: &mut Ledger, id: &str, budget: Option<f64>) -> Result<()> {
        let patch = CategoryPatch {
            budget: Some(budget),
            ..CategoryPatch::default()
        };
        Self::update(ledger, id, &patch)
    }

    /// Removes the category; transactions keep the dangling id and render as "unknown".
    pub fn remove(ledger: &mut Ledger, id: &str) -> Result<Category> {
        let index = ledger
            .categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| LedgerError::CategoryNotFound(id.to_string()))?;
        Ok(ledger.categories.remove(index))
    }

    pub fn list(ledger: &Ledger, kind: Option<CategoryKind>) -> Vec<&Category> {
        ledger
            .categories
            .iter()
            .filter(|category| kind.map_or(true, |kind| category.kind == kind))
            .collect()
    }

    fn validate(category: &Category) -> Result<()> {
        if category.label.trim().is_empty() {
            return Err(LedgerError::Validation("category label is required".into()));
        }
        if let Some(budget) = category.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(LedgerError::Validation(format!(
                    "budget must be zero or positive, got {}",
                    budget
                )));
            }
        }
        Ok(())
    }
}
