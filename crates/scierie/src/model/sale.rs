use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded sale ("vente").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    /// Row id.
    pub id: i64,
    /// Kind of wood sold; matched against stock `type`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Quantity sold.
    pub quantity: f64,
    /// Price per unit.
    pub unit_price: f64,
    /// `quantity * unit_price`.
    pub total: f64,
    /// Unit label (m³, planches, ...).
    pub unite: Option<String>,
    /// Sale date.
    pub date: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A sale to record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSale {
    /// Kind of wood sold.
    pub kind: String,
    /// Quantity sold.
    pub quantity: f64,
    /// Price per unit.
    pub unit_price: f64,
    /// Unit label.
    pub unite: Option<String>,
}

impl NewSale {
    /// Amount of this sale.
    #[must_use]
    pub fn total(&self) -> f64 {
        super::line_total(self.quantity, self.unit_price)
    }
}
