use rusqlite::{params, Row};
use tracing::{debug, info};

use super::stock::find_stock_by_type_in;
use super::{query_all, Storage};
use crate::error::Result;
use crate::model::{line_total, NewSale, Sale};
use crate::timestamp;

pub(super) const SELECT_SALE: &str =
    "SELECT id, type, quantity, unit_price, total, unite, date, created_at FROM ventes";

impl Storage {
    /// All sales, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_sales(&self) -> Result<Vec<Sale>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("{SELECT_SALE} ORDER BY created_at DESC, id DESC"),
            [],
            row_to_sale,
        )
    }

    /// Record a sale and take the sold quantity off the matching stock line.
    ///
    /// The stock quantity never drops below zero and its total is revalued
    /// at the stock's own unit price. A sale of a kind with no stock line is
    /// still recorded. Both writes happen in one transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn record_sale(&self, sale: &NewSale) -> Result<Sale> {
        self.transaction(|tx| {
            let now = timestamp::now();
            tx.execute(
                r"
                INSERT INTO ventes (type, quantity, unit_price, total, unite, date, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
                ",
                params![
                    sale.kind,
                    sale.quantity,
                    sale.unit_price,
                    sale.total(),
                    sale.unite,
                    timestamp::to_db(now),
                ],
            )?;
            let id = tx.last_insert_rowid();
            debug!("Inserted sale with id {}", id);

            if let Some(stock) = find_stock_by_type_in(tx, &sale.kind)? {
                let remaining = (stock.quantity - sale.quantity).max(0.0);
                tx.execute(
                    "UPDATE stocks SET quantity = ?1, total = ?2 WHERE id = ?3",
                    params![remaining, line_total(remaining, stock.unit_price), stock.id],
                )?;
                debug!("Stock {} ({}) now at {}", stock.id, stock.kind, remaining);
            } else {
                info!("Sale of {} recorded without a matching stock line", sale.kind);
            }

            Ok(Sale {
                id,
                kind: sale.kind.clone(),
                quantity: sale.quantity,
                unit_price: sale.unit_price,
                total: sale.total(),
                unite: sale.unite.clone(),
                date: now,
                created_at: now,
            })
        })
    }
}

pub(super) fn row_to_sale(row: &Row<'_>) -> rusqlite::Result<Sale> {
    Ok(Sale {
        id: row.get(0)?,
        kind: row.get(1)?,
        quantity: row.get(2)?,
        unit_price: row.get(3)?,
        total: row.get(4)?,
        unite: row.get(5)?,
        date: timestamp::column(row, 6)?,
        created_at: timestamp::column(row, 7)?,
    })
}
