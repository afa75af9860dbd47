use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A batch of sawn wood logged by the mill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    /// Row id.
    pub id: i64,
    /// Wood species / cut.
    pub type_bois: String,
    /// Quantity produced.
    pub quantity: f64,
    /// Value per unit.
    pub unit_price: f64,
    /// `quantity * unit_price`; feeds the profit summary.
    pub total: f64,
    /// Production date.
    pub date: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Values written by a production create or update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduction {
    /// Wood species / cut.
    pub type_bois: String,
    /// Quantity produced.
    pub quantity: f64,
    /// Value per unit.
    pub unit_price: f64,
}

impl NewProduction {
    /// Value of this batch.
    #[must_use]
    pub fn total(&self) -> f64 {
        super::line_total(self.quantity, self.unit_price)
    }
}
