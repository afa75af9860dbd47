use chrono::Utc;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Row};
use tracing::debug;

use super::{query_all, Storage};
use crate::error::{Error, Result};
use crate::model::{invoice_number_candidate, Invoice, InvoiceLine, InvoicePatch, NewInvoice};
use crate::timestamp;

const SELECT_INVOICE: &str = r"
SELECT id, numero_facture, client_nom, client_telephone, client_adresse,
       type_de_produit, quantity, price, products, total, mode_paiement, statut,
       date, created_at
FROM factures
";

const INVOICE_NOT_FOUND: &str = "Facture introuvable";

/// Every six-digit suffix is tried at most once.
const MAX_NUMBER_ATTEMPTS: u32 = 1_000_000;

impl Storage {
    /// All invoices, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn list_invoices(&self) -> Result<Vec<Invoice>> {
        let conn = self.conn()?;
        query_all(
            &conn,
            &format!("{SELECT_INVOICE} ORDER BY created_at DESC, id DESC"),
            [],
            row_to_invoice,
        )
    }

    /// Get an invoice by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_invoice(&self, id: i64) -> Result<Option<Invoice>> {
        let conn = self.conn()?;
        get_invoice_in(&conn, id)
    }

    /// Create an invoice dated now with a fresh `FAC-NNNNNN` number.
    ///
    /// # Errors
    ///
    /// Returns an error if the invoice has no lines or the database
    /// operation fails.
    pub fn create_invoice(&self, invoice: &NewInvoice) -> Result<Invoice> {
        let first = first_line(invoice)?.clone();
        let products = serde_json::to_string(&invoice.lines)?;

        self.transaction(|tx| {
            let now = timestamp::now();
            let numero = next_invoice_number(tx, Utc::now().timestamp_millis())?;

            tx.execute(
                r"
                INSERT INTO factures (
                    numero_facture, client_nom, client_telephone, client_adresse,
                    type_de_produit, quantity, price, products, total,
                    mode_paiement, statut, date, created_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)
                ",
                params![
                    numero,
                    invoice.client_nom,
                    invoice.client_telephone,
                    invoice.client_adresse,
                    first.type_de_produit,
                    first.quantity,
                    first.price,
                    products,
                    invoice.total(),
                    invoice.mode_paiement,
                    invoice.statut,
                    timestamp::to_db(now),
                ],
            )?;
            let id = tx.last_insert_rowid();
            debug!("Inserted invoice {} with id {}", numero, id);

            Ok(Invoice {
                id,
                numero_facture: numero,
                client_nom: invoice.client_nom.clone(),
                client_telephone: invoice.client_telephone.clone(),
                client_adresse: invoice.client_adresse.clone(),
                type_de_produit: first.type_de_produit,
                quantity: first.quantity,
                price: first.price,
                products: invoice.lines.clone(),
                total: invoice.total(),
                mode_paiement: invoice.mode_paiement.clone(),
                statut: invoice.statut.clone(),
                date: now,
                created_at: now,
            })
        })
    }

    /// Apply a partial update to an invoice. The number and date are kept.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn update_invoice(&self, id: i64, patch: InvoicePatch) -> Result<Invoice> {
        self.transaction(|tx| {
            let current =
                get_invoice_in(tx, id)?.ok_or_else(|| Error::not_found(INVOICE_NOT_FOUND))?;
            let next = patch.apply(&current);
            let first = first_line(&next)?.clone();
            let products = serde_json::to_string(&next.lines)?;

            tx.execute(
                r"
                UPDATE factures
                SET client_nom = ?1, client_telephone = ?2, client_adresse = ?3,
                    type_de_produit = ?4, quantity = ?5, price = ?6, products = ?7,
                    total = ?8, mode_paiement = ?9, statut = ?10
                WHERE id = ?11
                ",
                params![
                    next.client_nom,
                    next.client_telephone,
                    next.client_adresse,
                    first.type_de_produit,
                    first.quantity,
                    first.price,
                    products,
                    next.total(),
                    next.mode_paiement,
                    next.statut,
                    id,
                ],
            )?;
            debug!("Updated invoice {}", current.numero_facture);

            Ok(Invoice {
                id,
                numero_facture: current.numero_facture,
                client_nom: next.client_nom.clone(),
                client_telephone: next.client_telephone.clone(),
                client_adresse: next.client_adresse.clone(),
                type_de_produit: first.type_de_produit,
                quantity: first.quantity,
                price: first.price,
                total: next.total(),
                products: next.lines,
                mode_paiement: next.mode_paiement,
                statut: next.statut,
                date: current.date,
                created_at: current.created_at,
            })
        })
    }

    /// Delete an invoice, returning it.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id.
    pub fn delete_invoice(&self, id: i64) -> Result<Invoice> {
        self.transaction(|tx| {
            let existing =
                get_invoice_in(tx, id)?.ok_or_else(|| Error::not_found(INVOICE_NOT_FOUND))?;
            tx.execute("DELETE FROM factures WHERE id = ?1", [id])?;
            debug!("Deleted invoice {}", existing.numero_facture);
            Ok(existing)
        })
    }
}

fn first_line(invoice: &NewInvoice) -> Result<&InvoiceLine> {
    invoice
        .first_line()
        .ok_or_else(|| Error::missing_fields("Tous les champs sont requis"))
}

/// First candidate number not already used.
fn next_invoice_number(conn: &Connection, epoch_millis: i64) -> Result<String> {
    for attempt in 0..MAX_NUMBER_ATTEMPTS {
        let candidate = invoice_number_candidate(epoch_millis, attempt);
        let taken: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM factures WHERE numero_facture = ?1)",
            [&candidate],
            |row| row.get(0),
        )?;
        if !taken {
            return Ok(candidate);
        }
        debug!("Invoice number {} taken, trying next", candidate);
    }
    Err(Error::internal("no free invoice number left"))
}

fn get_invoice_in(conn: &Connection, id: i64) -> Result<Option<Invoice>> {
    let invoice = conn
        .query_row(&format!("{SELECT_INVOICE} WHERE id = ?1"), [id], row_to_invoice)
        .optional()?;
    Ok(invoice)
}

fn row_to_invoice(row: &Row<'_>) -> rusqlite::Result<Invoice> {
    let products_json: String = row.get(8)?;
    let products: Vec<InvoiceLine> = serde_json::from_str(&products_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(8, Type::Text, Box::new(e)))?;

    Ok(Invoice {
        id: row.get(0)?,
        numero_facture: row.get(1)?,
        client_nom: row.get(2)?,
        client_telephone: row.get(3)?,
        client_adresse: row.get(4)?,
        type_de_produit: row.get(5)?,
        quantity: row.get(6)?,
        price: row.get(7)?,
        products,
        total: row.get(9)?,
        mode_paiement: row.get(10)?,
        statut: row.get(11)?,
        date: timestamp::column(row, 12)?,
        created_at: timestamp::column(row, 13)?,
    })
}
