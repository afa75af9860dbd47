//! Business records kept by the sawmill.
//!
//! Records serialize with camelCase keys so the JSON matches what the web
//! pages already consume. Each `New*` type is a validated write request the
//! storage layer accepts as is.

mod charge;
mod expense;
mod invoice;
mod production;
mod profit;
mod sale;
mod stock;
mod user;

pub use charge::{Charge, ChargePatch, NewCharge};
pub use expense::{Expense, ExpensePatch, NewExpense};
pub use invoice::{
    invoice_number_candidate, Invoice, InvoiceLine, InvoicePatch, NewInvoice,
    DEFAULT_INVOICE_STATUS,
};
pub use production::{NewProduction, Production};
pub use profit::{ProfitPoint, ProfitSummary};
pub use sale::{NewSale, Sale};
pub use stock::{NewStockItem, StockItem};
pub use user::{NewUser, Role, User};

/// Total of a line: quantity times unit price.
///
/// Always recomputed server-side; client-supplied totals are ignored.
#[must_use]
pub fn line_total(quantity: f64, unit_price: f64) -> f64 {
    quantity * unit_price
}
