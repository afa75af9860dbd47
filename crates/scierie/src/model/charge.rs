use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A supplier delivery billed to the mill (logs, fuel, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    /// Row id.
    pub id: i64,
    /// Delivery date.
    pub date: DateTime<Utc>,
    /// Supplier name.
    pub fournisseur: String,
    /// Number of pieces delivered.
    pub quantite: f64,
    /// Weight delivered.
    pub poids: f64,
    /// Price paid; feeds the profit summary.
    pub prix: f64,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A charge to record.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCharge {
    /// Delivery date.
    pub date: DateTime<Utc>,
    /// Supplier name.
    pub fournisseur: String,
    /// Number of pieces.
    pub quantite: f64,
    /// Weight.
    pub poids: f64,
    /// Price paid.
    pub prix: f64,
}

/// Partial update of a charge; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChargePatch {
    /// New date.
    pub date: Option<DateTime<Utc>>,
    /// New supplier.
    pub fournisseur: Option<String>,
    /// New piece count.
    pub quantite: Option<f64>,
    /// New weight.
    pub poids: Option<f64>,
    /// New price.
    pub prix: Option<f64>,
}

impl ChargePatch {
    /// Apply the patch on top of an existing record.
    #[must_use]
    pub fn apply(self, current: &Charge) -> NewCharge {
        NewCharge {
            date: self.date.unwrap_or(current.date),
            fournisseur: self
                .fournisseur
                .unwrap_or_else(|| current.fournisseur.clone()),
            quantite: self.quantite.unwrap_or(current.quantite),
            poids: self.poids.unwrap_or(current.poids),
            prix: self.prix.unwrap_or(current.prix),
        }
    }
}
