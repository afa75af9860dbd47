use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Quantity on hand for one kind of wood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    /// Row id.
    pub id: i64,
    /// Kind of wood / product. Unique across the table.
    #[serde(rename = "type")]
    pub kind: String,
    /// Quantity on hand.
    pub quantity: f64,
    /// Valuation per unit.
    pub unit_price: f64,
    /// `quantity * unit_price`.
    pub total: f64,
    /// Last time the quantity was set.
    pub date: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// Values written by a stock create, upsert or update.
#[derive(Debug, Clone, PartialEq)]
pub struct NewStockItem {
    /// Kind of wood / product.
    pub kind: String,
    /// Quantity on hand.
    pub quantity: f64,
    /// Valuation per unit.
    pub unit_price: f64,
}

impl NewStockItem {
    /// Valuation of this line.
    #[must_use]
    pub fn total(&self) -> f64 {
        super::line_total(self.quantity, self.unit_price)
    }
}
