use chrono::NaiveDate;
use rusqlite::{params, types::Type, Connection, Row};
use tracing::debug;

use super::{query_all, sum_column, Storage};
use crate::error::Result;
use crate::model::{ProfitPoint, ProfitSummary};
use crate::timestamp;

const PROFIT_HISTORY: &str = r"
WITH movements AS (
    SELECT substr(date, 1, 10) AS day, total AS production, 0.0 AS charges, 0.0 AS depenses
    FROM productions
    UNION ALL
    SELECT substr(date, 1, 10), 0.0, prix, 0.0 FROM charges
    UNION ALL
    SELECT substr(date, 1, 10), 0.0, 0.0, montant FROM depenses
)
SELECT day, SUM(production), SUM(charges), SUM(depenses)
FROM movements
GROUP BY day
ORDER BY day
";

impl Storage {
    /// Recompute the profit summary from the source tables and store it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn recompute_profit(&self) -> Result<ProfitSummary> {
        self.transaction(|tx| recompute_profit_in(tx))
    }

    /// Read the stored profit summary without recomputing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn profit_summary(&self) -> Result<ProfitSummary> {
        let conn = self.conn()?;
        let summary = conn.query_row(
            r"
            SELECT total_production, total_charges, total_depenses, benefice_net, updated_at
            FROM benefice WHERE id = 1
            ",
            [],
            |row| {
                Ok(ProfitSummary {
                    total_production: row.get(0)?,
                    total_charges: row.get(1)?,
                    total_depenses: row.get(2)?,
                    benefice_net: row.get(3)?,
                    updated_at: timestamp::column(row, 4)?,
                })
            },
        )?;
        Ok(summary)
    }

    /// Per-day production, charges, expenses and resulting profit, oldest
    /// day first. Days with no movement are omitted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn profit_history(&self) -> Result<Vec<ProfitPoint>> {
        let conn = self.conn()?;
        query_all(&conn, PROFIT_HISTORY, [], row_to_point)
    }
}

/// Recompute and upsert the single profit row using `conn`.
///
/// Called inside the transaction of every mutation of productions, charges
/// or expenses.
pub(super) fn recompute_profit_in(conn: &Connection) -> Result<ProfitSummary> {
    let summary = ProfitSummary::from_totals(
        sum_column(conn, "productions", "total")?,
        sum_column(conn, "charges", "prix")?,
        sum_column(conn, "depenses", "montant")?,
        timestamp::now(),
    );

    conn.execute(
        r"
        INSERT INTO benefice
            (id, total_production, total_charges, total_depenses, benefice_net, updated_at)
        VALUES (1, ?1, ?2, ?3, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            total_production = excluded.total_production,
            total_charges = excluded.total_charges,
            total_depenses = excluded.total_depenses,
            benefice_net = excluded.benefice_net,
            updated_at = excluded.updated_at
        ",
        params![
            summary.total_production,
            summary.total_charges,
            summary.total_depenses,
            summary.benefice_net,
            timestamp::to_db(summary.updated_at),
        ],
    )?;

    debug!("Profit recomputed: {}", summary.benefice_net);
    Ok(summary)
}

fn row_to_point(row: &Row<'_>) -> rusqlite::Result<ProfitPoint> {
    let day: String = row.get(0)?;
    let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
    let production: f64 = row.get(1)?;
    let charges: f64 = row.get(2)?;
    let depenses: f64 = row.get(3)?;

    Ok(ProfitPoint {
        date,
        production,
        charges,
        depenses,
        benefice: production - charges - depenses,
    })
}
