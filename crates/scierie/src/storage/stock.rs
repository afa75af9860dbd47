use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{map_unique_violation, query_all, Storage};
use crate::error::{Error, Result};
use crate::model::{NewStockItem, StockItem};
use crate::timestamp;

pub(super) const SELECT_STOCK: &str =
    "SELECT id, type, quantity, unit_price, total, date, created_at FROM stocks";

const STOCK_NOT_FOUND: &str = "Stock introuvable";
const DUPLICATE_TYPE: &str = "Un stock de ce type existe déjà.";

impl Storage {
    /// All stock lines, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_stock(&self) -> Result<Vec<StockItem>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("{SELECT_STOCK} ORDER BY created_at DESC, id DESC"),
            [],
            row_to_stock,
        )
    }

    /// Get the stock line for a kind of wood.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn find_stock_by_type(&self, kind: &str) -> Result<Option<StockItem>> {
        let conn = self.conn()?;
        find_stock_by_type_in(&conn, kind)
    }

    /// Set the quantity and price for a kind of wood, creating the line if
    /// the kind is new. `date` is bumped either way.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn upsert_stock(&self, item: &NewStockItem) -> Result<StockItem> {
        self.transaction(|tx| {
            let now = timestamp::to_db(timestamp::now());
            tx.execute(
                r"
                INSERT INTO stocks (type, quantity, unit_price, total, date, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                ON CONFLICT(type) DO UPDATE SET
                    quantity = excluded.quantity,
                    unit_price = excluded.unit_price,
                    total = excluded.total,
                    date = excluded.date
                ",
                params![item.kind, item.quantity, item.unit_price, item.total(), now],
            )?;

            let stored = find_stock_by_type_in(tx, &item.kind)?
                .ok_or_else(|| Error::internal("stock row missing after upsert"))?;
            debug!("Upserted stock {} ({})", stored.id, stored.kind);
            Ok(stored)
        })
    }

    /// Replace a stock line.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id, or a conflict if the new
    /// type already belongs to another line.
    pub fn update_stock(&self, id: i64, item: &NewStockItem) -> Result<StockItem> {
        self.transaction(|tx| {
            let changed = tx
                .execute(
                    r"
                    UPDATE stocks
                    SET type = ?1, quantity = ?2, unit_price = ?3, total = ?4, date = ?5
                    WHERE id = ?6
                    ",
                    params![
                        item.kind,
                        item.quantity,
                        item.unit_price,
                        item.total(),
                        timestamp::to_db(timestamp::now()),
                        id,
                    ],
                )
                .map_err(|e| map_unique_violation(e, DUPLICATE_TYPE))?;
            if changed == 0 {
                return Err(Error::not_found(STOCK_NOT_FOUND));
            }

            debug!("Updated stock {}", id);
            get_stock_in(tx, id)?.ok_or_else(|| Error::not_found(STOCK_NOT_FOUND))
        })
    }

    /// Delete a stock line, returning it.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn delete_stock(&self, id: i64) -> Result<StockItem> {
        self.transaction(|tx| {
            let existing = get_stock_in(tx, id)?.ok_or_else(|| Error::not_found(STOCK_NOT_FOUND))?;
            tx.execute("DELETE FROM stocks WHERE id = ?1", [id])?;
            debug!("Deleted stock {}", id);
            Ok(existing)
        })
    }
}

fn get_stock_in(conn: &Connection, id: i64) -> Result<Option<StockItem>> {
    let item = conn
        .query_row(&format!("{SELECT_STOCK} WHERE id = ?1"), [id], row_to_stock)
        .optional()?;
    Ok(item)
}

pub(super) fn find_stock_by_type_in(conn: &Connection, kind: &str) -> Result<Option<StockItem>> {
    let item = conn
        .query_row(&format!("{SELECT_STOCK} WHERE type = ?1"), [kind], row_to_stock)
        .optional()?;
    Ok(item)
}

pub(super) fn row_to_stock(row: &Row<'_>) -> rusqlite::Result<StockItem> {
    Ok(StockItem {
        id: row.get(0)?,
        kind: row.get(1)?,
        quantity: row.get(2)?,
        unit_price: row.get(3)?,
        total: row.get(4)?,
        date: timestamp::column(row, 5)?,
        created_at: timestamp::column(row, 6)?,
    })
}
