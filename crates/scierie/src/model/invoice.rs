use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status given to invoices created without one.
pub const DEFAULT_INVOICE_STATUS: &str = "En attente";

/// One product line on an invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLine {
    /// Product sold.
    pub type_de_produit: String,
    /// Quantity.
    pub quantity: f64,
    /// Price per unit.
    pub price: f64,
    /// `quantity * price`.
    pub total: f64,
}

impl InvoiceLine {
    /// Build a line, computing its total.
    #[must_use]
    pub fn new(type_de_produit: impl Into<String>, quantity: f64, price: f64) -> Self {
        Self {
            type_de_produit: type_de_produit.into(),
            quantity,
            price,
            total: super::line_total(quantity, price),
        }
    }
}

/// A customer invoice ("facture").
///
/// `type_de_produit`, `quantity` and `price` mirror the first line so that
/// single-product clients keep working; `products` holds every line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Row id.
    pub id: i64,
    /// Human-facing number, `FAC-NNNNNN`.
    pub numero_facture: String,
    /// Customer name.
    pub client_nom: String,
    /// Customer phone.
    pub client_telephone: String,
    /// Customer address.
    pub client_adresse: Option<String>,
    /// First line's product.
    pub type_de_produit: String,
    /// First line's quantity.
    pub quantity: f64,
    /// First line's price.
    pub price: f64,
    /// All lines.
    pub products: Vec<InvoiceLine>,
    /// Sum of line totals.
    pub total: f64,
    /// Payment mode (cash, mobile money, ...).
    pub mode_paiement: String,
    /// Payment status.
    pub statut: String,
    /// Invoice date.
    pub date: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// An invoice to create or the full replacement of one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInvoice {
    /// Customer name.
    pub client_nom: String,
    /// Customer phone.
    pub client_telephone: String,
    /// Customer address.
    pub client_adresse: Option<String>,
    /// Lines; never empty.
    pub lines: Vec<InvoiceLine>,
    /// Payment mode.
    pub mode_paiement: String,
    /// Payment status.
    pub statut: String,
}

impl NewInvoice {
    /// Sum of line totals.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|line| line.total).sum()
    }

    /// The line whose values are mirrored in the flat invoice columns.
    #[must_use]
    pub fn first_line(&self) -> Option<&InvoiceLine> {
        self.lines.first()
    }
}

/// Partial update of an invoice; `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoicePatch {
    /// New customer name.
    pub client_nom: Option<String>,
    /// New customer phone.
    pub client_telephone: Option<String>,
    /// New customer address.
    pub client_adresse: Option<String>,
    /// Replacement lines.
    pub lines: Option<Vec<InvoiceLine>>,
    /// New payment mode.
    pub mode_paiement: Option<String>,
    /// New status.
    pub statut: Option<String>,
}

impl InvoicePatch {
    /// Apply the patch on top of an existing invoice.
    #[must_use]
    pub fn apply(self, current: &Invoice) -> NewInvoice {
        NewInvoice {
            client_nom: self
                .client_nom
                .unwrap_or_else(|| current.client_nom.clone()),
            client_telephone: self
                .client_telephone
                .unwrap_or_else(|| current.client_telephone.clone()),
            client_adresse: self.client_adresse.or_else(|| current.client_adresse.clone()),
            lines: self.lines.unwrap_or_else(|| current.products.clone()),
            mode_paiement: self
                .mode_paiement
                .unwrap_or_else(|| current.mode_paiement.clone()),
            statut: self.statut.unwrap_or_else(|| current.statut.clone()),
        }
    }
}

/// Candidate invoice number: `FAC-` followed by the last six digits of the
/// epoch milliseconds, shifted by `attempt` when an earlier candidate was
/// already taken.
#[must_use]
pub fn invoice_number_candidate(epoch_millis: i64, attempt: u32) -> String {
    let suffix = (epoch_millis + i64::from(attempt)).rem_euclid(1_000_000);
    format!("FAC-{suffix:06}")
}
