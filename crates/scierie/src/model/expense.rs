use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An operating expense ("dépense").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Row id.
    pub id: i64,
    /// When the expense occurred.
    pub date: DateTime<Utc>,
    /// Free-form category (fuel, wages, ...).
    pub categorie: String,
    /// Amount spent.
    pub montant: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// An expense to record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// When the expense occurred.
    pub date: DateTime<Utc>,
    /// Category.
    pub categorie: String,
    /// Amount spent.
    pub montant: f64,
}

/// Partial update of an expense; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpensePatch {
    /// New date.
    pub date: Option<DateTime<Utc>>,
    /// New category.
    pub categorie: Option<String>,
    /// New amount.
    pub montant: Option<f64>,
}

impl ExpensePatch {
    /// Apply the patch on top of an existing record.
    #[must_use]
    pub fn apply(self, current: &Expense) -> NewExpense {
        NewExpense {
            date: self.date.unwrap_or(current.date),
            categorie: self.categorie.unwrap_or_else(|| current.categorie.clone()),
            montant: self.montant.unwrap_or(current.montant),
        }
    }
}
