use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::profit::recompute_profit_in;
use super::{query_all, Storage};
use crate::error::{Error, Result};
use crate::model::{NewProduction, Production};
use crate::timestamp;

pub(super) const SELECT_PRODUCTION: &str =
    "SELECT id, type_bois, quantity, unit_price, total, date, created_at FROM productions";

const PRODUCTION_NOT_FOUND: &str = "Production introuvable";

impl Storage {
    /// All production batches, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_productions(&self) -> Result<Vec<Production>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("{SELECT_PRODUCTION} ORDER BY date DESC, id DESC"),
            [],
            row_to_production,
        )
    }

    /// Get a production batch by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_production(&self, id: i64) -> Result<Option<Production>> {
        let conn = self.conn()?;
        get_production_in(&conn, id)
    }

    /// Log a production batch dated now and recompute the profit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_production(&self, production: &NewProduction) -> Result<Production> {
        self.transaction(|tx| {
            let now = timestamp::now();
            tx.execute(
                r"
                INSERT INTO productions (type_bois, quantity, unit_price, total, date, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                ",
                params![
                    production.type_bois,
                    production.quantity,
                    production.unit_price,
                    production.total(),
                    timestamp::to_db(now),
                ],
            )?;
            let id = tx.last_insert_rowid();
            debug!("Inserted production with id {}", id);

            recompute_profit_in(tx)?;

            Ok(Production {
                id,
                type_bois: production.type_bois.clone(),
                quantity: production.quantity,
                unit_price: production.unit_price,
                total: production.total(),
                date: now,
                created_at: now,
            })
        })
    }

    /// Replace a production batch's values. The date is kept.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn update_production(&self, id: i64, production: &NewProduction) -> Result<Production> {
        self.transaction(|tx| {
            let changed = tx.execute(
                r"
                UPDATE productions
                SET type_bois = ?1, quantity = ?2, unit_price = ?3, total = ?4
                WHERE id = ?5
                ",
                params![
                    production.type_bois,
                    production.quantity,
                    production.unit_price,
                    production.total(),
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(Error::not_found(PRODUCTION_NOT_FOUND));
            }
            debug!("Updated production {}", id);

            recompute_profit_in(tx)?;
            get_production_in(tx, id)?.ok_or_else(|| Error::not_found(PRODUCTION_NOT_FOUND))
        })
    }

    /// Delete a production batch, returning it.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn delete_production(&self, id: i64) -> Result<Production> {
        self.transaction(|tx| {
            let existing = get_production_in(tx, id)?
                .ok_or_else(|| Error::not_found(PRODUCTION_NOT_FOUND))?;
            tx.execute("DELETE FROM productions WHERE id = ?1", [id])?;
            debug!("Deleted production {}", id);

            recompute_profit_in(tx)?;
            Ok(existing)
        })
    }
}

fn get_production_in(conn: &Connection, id: i64) -> Result<Option<Production>> {
    let production = conn
        .query_row(
            &format!("{SELECT_PRODUCTION} WHERE id = ?1"),
            [id],
            row_to_production,
        )
        .optional()?;
    Ok(production)
}

pub(super) fn row_to_production(row: &Row<'_>) -> rusqlite::Result<Production> {
    Ok(Production {
        id: row.get(0)?,
        type_bois: row.get(1)?,
        quantity: row.get(2)?,
        unit_price: row.get(3)?,
        total: row.get(4)?,
        date: timestamp::column(row, 5)?,
        created_at: timestamp::column(row, 6)?,
    })
}
