use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use super::profit::recompute_profit_in;
use super::{query_all, Storage};
use crate::error::{Error, Result};
use crate::model::{Expense, ExpensePatch, NewExpense};
use crate::timestamp;

pub(super) const SELECT_EXPENSE: &str =
    "SELECT id, date, categorie, montant, created_at FROM depenses";

const EXPENSE_NOT_FOUND: &str = "Dépense introuvable";

impl Storage {
    /// All expenses, most recent date first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_expenses(&self) -> Result<Vec<Expense>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("{SELECT_EXPENSE} ORDER BY date DESC, id DESC"),
            [],
            row_to_expense,
        )
    }

    /// Record an expense and recompute the profit.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn create_expense(&self, expense: &NewExpense) -> Result<Expense> {
        self.transaction(|tx| {
            let created_at = timestamp::now();
            tx.execute(
                r"
                INSERT INTO depenses (date, categorie, montant, created_at)
                VALUES (?1, ?2, ?3, ?4)
                ",
                params![
                    timestamp::to_db(expense.date),
                    expense.categorie,
                    expense.montant,
                    timestamp::to_db(created_at),
                ],
            )?;
            let id = tx.last_insert_rowid();
            debug!("Inserted expense with id {}", id);

            recompute_profit_in(tx)?;

            Ok(Expense {
                id,
                date: expense.date,
                categorie: expense.categorie.clone(),
                montant: expense.montant,
                created_at,
            })
        })
    }

    /// Apply a partial update to an expense and recompute the profit.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn update_expense(&self, id: i64, patch: ExpensePatch) -> Result<Expense> {
        self.transaction(|tx| {
            let current =
                get_expense_in(tx, id)?.ok_or_else(|| Error::not_found(EXPENSE_NOT_FOUND))?;
            let next = patch.apply(&current);

            tx.execute(
                "UPDATE depenses SET date = ?1, categorie = ?2, montant = ?3 WHERE id = ?4",
                params![timestamp::to_db(next.date), next.categorie, next.montant, id],
            )?;
            debug!("Updated expense {}", id);

            recompute_profit_in(tx)?;

            Ok(Expense {
                id,
                date: next.date,
                categorie: next.categorie,
                montant: next.montant,
                created_at: current.created_at,
            })
        })
    }

    /// Delete an expense, returning it, and recompute the profit.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn delete_expense(&self, id: i64) -> Result<Expense> {
        self.transaction(|tx| {
            let existing =
                get_expense_in(tx, id)?.ok_or_else(|| Error::not_found(EXPENSE_NOT_FOUND))?;
            tx.execute("DELETE FROM depenses WHERE id = ?1", [id])?;
            debug!("Deleted expense {}", id);

            recompute_profit_in(tx)?;
            Ok(existing)
        })
    }
}

fn get_expense_in(conn: &Connection, id: i64) -> Result<Option<Expense>> {
    let expense = conn
        .query_row(&format!("{SELECT_EXPENSE} WHERE id = ?1"), [id], row_to_expense)
        .optional()?;
    Ok(expense)
}

pub(super) fn row_to_expense(row: &Row<'_>) -> rusqlite::Result<Expense> {
    Ok(Expense {
        id: row.get(0)?,
        date: timestamp::column(row, 1)?,
        categorie: row.get(2)?,
        montant: row.get(3)?,
        created_at: timestamp::column(row, 4)?,
    })
}
