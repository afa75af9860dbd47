use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::profit::recompute_profit_in;
use super::{query_all, Storage};
use crate::error::{Error, Result};
use crate::model::{Charge, ChargePatch, NewCharge};
use crate::timestamp;

pub(super) const SELECT_CHARGE: &str =
    "SELECT id, date, fournisseur, quantite, poids, prix, created_at FROM charges";

const CHARGE_NOT_FOUND: &str = "Charge introuvable";

impl Storage {
    /// All supplier charges, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_charges(&self) -> Result<Vec<Charge>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("{SELECT_CHARGE} ORDER BY date DESC, id DESC"),
            [],
            row_to_charge,
        )
    }

    /// Record a supplier charge and recompute the profit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_charge(&self, charge: &NewCharge) -> Result<Charge> {
        self.transaction(|tx| {
            let created_at = timestamp::now();
            tx.execute(
                r"
                INSERT INTO charges (date, fournisseur, quantite, poids, prix, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                ",
                params![
                    timestamp::to_db(charge.date),
                    charge.fournisseur,
                    charge.quantite,
                    charge.poids,
                    charge.prix,
                    timestamp::to_db(created_at),
                ],
            )?;
            let id = tx.last_insert_rowid();
            debug!("Inserted charge with id {}", id);

            recompute_profit_in(tx)?;

            Ok(Charge {
                id,
                date: charge.date,
                fournisseur: charge.fournisseur.clone(),
                quantite: charge.quantite,
                poids: charge.poids,
                prix: charge.prix,
                created_at,
            })
        })
    }

    /// Apply a partial update to a charge and recompute the profit.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn update_charge(&self, id: i64, patch: ChargePatch) -> Result<Charge> {
        self.transaction(|tx| {
            let current =
                get_charge_in(tx, id)?.ok_or_else(|| Error::not_found(CHARGE_NOT_FOUND))?;
            let next = patch.apply(&current);

            tx.execute(
                r"
                UPDATE charges
                SET date = ?1, fournisseur = ?2, quantite = ?3, poids = ?4, prix = ?5
                WHERE id = ?6
                ",
                params![
                    timestamp::to_db(next.date),
                    next.fournisseur,
                    next.quantite,
                    next.poids,
                    next.prix,
                    id,
                ],
            )?;
            debug!("Updated charge {}", id);

            recompute_profit_in(tx)?;

            Ok(Charge {
                id,
                date: next.date,
                fournisseur: next.fournisseur,
                quantite: next.quantite,
                poids: next.poids,
                prix: next.prix,
                created_at: current.created_at,
            })
        })
    }

    /// Delete a charge, returning it, and recompute the profit.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn delete_charge(&self, id: i64) -> Result<Charge> {
        self.transaction(|tx| {
            let existing =
                get_charge_in(tx, id)?.ok_or_else(|| Error::not_found(CHARGE_NOT_FOUND))?;
            tx.execute("DELETE FROM charges WHERE id = ?1", [id])?;
            debug!("Deleted charge {}", id);

            recompute_profit_in(tx)?;
            Ok(existing)
        })
    }
}

fn get_charge_in(conn: &Connection, id: i64) -> Result<Option<Charge>> {
    let charge = conn
        .query_row(&format!("{SELECT_CHARGE} WHERE id = ?1"), [id], row_to_charge)
        .optional()?;
    Ok(charge)
}

pub(super) fn row_to_charge(row: &Row<'_>) -> rusqlite::Result<Charge> {
    Ok(Charge {
        id: row.get(0)?,
        date: timestamp::column(row, 1)?,
        fournisseur: row.get(2)?,
        quantite: row.get(3)?,
        poids: row.get(4)?,
        prix: row.get(5)?,
        created_at: timestamp::column(row, 6)?,
    })
}
