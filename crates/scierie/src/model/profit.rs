use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The single-row profit summary ("bénéfice").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSummary {
    /// Sum of production totals.
    pub total_production: f64,
    /// Sum of charge prices.
    pub total_charges: f64,
    /// Sum of expense amounts.
    pub total_depenses: f64,
    /// Production minus charges minus expenses.
    pub benefice_net: f64,
    /// When the row was last recomputed.
    pub updated_at: DateTime<Utc>,
}

impl ProfitSummary {
    /// Build a summary from the three sums.
    #[must_use]
    pub fn from_totals(
        total_production: f64,
        total_charges: f64,
        total_depenses: f64,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total_production,
            total_charges,
            total_depenses,
            benefice_net: total_production - total_charges - total_depenses,
            updated_at,
        }
    }
}

/// Per-day profit, one point of the profit chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitPoint {
    /// Calendar day.
    pub date: NaiveDate,
    /// Production total that day.
    pub production: f64,
    /// Charges that day.
    pub charges: f64,
    /// Expenses that day.
    pub depenses: f64,
    /// `production - charges - depenses`.
    pub benefice: f64,
}
