use serde::Serialize;

use super::charges::{row_to_charge, SELECT_CHARGE};
use super::expenses::{row_to_expense, SELECT_EXPENSE};
use super::productions::{row_to_production, SELECT_PRODUCTION};
use super::profit::recompute_profit_in;
use super::sales::{row_to_sale, SELECT_SALE};
use super::stock::{row_to_stock, SELECT_STOCK};
use super::{query_all, sum_column, Storage};
use crate::error::Result;
use crate::model::{Charge, Expense, Production, Sale, StockItem};

/// Table-wide totals shown on the dashboard cards.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    /// Valuation of all stock.
    pub total_stock: f64,
    /// Amount of all sales.
    pub total_ventes: f64,
    /// Amount of all expenses.
    pub total_depenses: f64,
    /// Amount of all supplier charges.
    pub total_charges: f64,
    /// Net profit.
    pub total_benefice: f64,
}

/// Most recent rows of each table plus the totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    /// Latest stock lines.
    pub stocks: Vec<StockItem>,
    /// Latest sales.
    pub ventes: Vec<Sale>,
    /// Latest production batches.
    pub productions: Vec<Production>,
    /// Latest expenses.
    pub depenses: Vec<Expense>,
    /// Latest supplier charges.
    pub charges: Vec<Charge>,
    /// Totals.
    pub resume: DashboardTotals,
}

impl Storage {
    /// Build the dashboard: the `limit` most recently created rows of each
    /// table and table-wide totals. The profit summary is recomputed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn dashboard(&self, limit: usize) -> Result<Dashboard> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        self.transaction(|tx| {
            let recent = |select: &str| format!("{select} ORDER BY created_at DESC, id DESC LIMIT ?1");

            let profit = recompute_profit_in(tx)?;
            Ok(Dashboard {
                stocks: query_all(tx, &recent(SELECT_STOCK), [limit], row_to_stock)?,
                ventes: query_all(tx, &recent(SELECT_SALE), [limit], row_to_sale)?,
                productions: query_all(tx, &recent(SELECT_PRODUCTION), [limit], row_to_production)?,
                depenses: query_all(tx, &recent(SELECT_EXPENSE), [limit], row_to_expense)?,
                charges: query_all(tx, &recent(SELECT_CHARGE), [limit], row_to_charge)?,
                resume: DashboardTotals {
                    total_stock: sum_column(tx, "stocks", "total")?,
                    total_ventes: sum_column(tx, "ventes", "total")?,
                    total_depenses: profit.total_depenses,
                    total_charges: profit.total_charges,
                    total_benefice: profit.benefice_net,
                },
            })
        })
    }
}
