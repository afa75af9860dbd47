use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::input::{self, non_zero, non_zero_id, parse_id, text, IdQuery, JsonBody, QueryParams};
use super::{with_storage, AppState};
use crate::error::{Error, Result};
use crate::model::{Invoice, InvoiceLine, InvoicePatch, NewInvoice, DEFAULT_INVOICE_STATUS};
use crate::pdf;

const MISSING_FIELDS: &str = "Tous les champs sont requis";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LinePayload {
    type_de_produit: Option<String>,
    #[serde(deserialize_with = "input::number")]
    quantity: Option<f64>,
    #[serde(deserialize_with = "input::number")]
    price: Option<f64>,
}

impl LinePayload {
    fn into_line(self) -> Option<InvoiceLine> {
        Some(InvoiceLine::new(
            text(self.type_de_produit)?,
            non_zero(self.quantity)?,
            non_zero(self.price)?,
        ))
    }
}

/// Invoice body. Lines come either as `products` or as the flat
/// `typeDeProduit` / `quantity` / `price` fields of a one-line invoice.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvoicePayload {
    #[serde(deserialize_with = "input::id")]
    id: Option<i64>,
    client_nom: Option<String>,
    client_telephone: Option<String>,
    client_adresse: Option<String>,
    mode_paiement: Option<String>,
    statut: Option<String>,
    products: Option<Vec<LinePayload>>,
    #[serde(flatten)]
    single: LinePayload,
}

impl InvoicePayload {
    /// The lines sent, `Ok(None)` when none were sent at all.
    fn lines(&mut self) -> Result<Option<Vec<InvoiceLine>>> {
        match self.products.take().filter(|products| !products.is_empty()) {
            Some(products) => products
                .into_iter()
                .map(|line| line.into_line().ok_or_else(|| Error::missing_fields(MISSING_FIELDS)))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            None => Ok(std::mem::take(&mut self.single).into_line().map(|line| vec![line])),
        }
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Invoice>>> {
    let invoices = with_storage(&state, |storage| storage.list_invoices()).await?;
    Ok(Json(invoices))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(mut payload): JsonBody<InvoicePayload>,
) -> Result<Json<Invoice>> {
    let lines = payload.lines()?;
    let (Some(client_nom), Some(client_telephone), Some(lines)) = (
        text(payload.client_nom),
        text(payload.client_telephone),
        lines,
    ) else {
        return Err(Error::missing_fields(MISSING_FIELDS));
    };
    let invoice = NewInvoice {
        client_nom,
        client_telephone,
        client_adresse: text(payload.client_adresse),
        lines,
        mode_paiement: text(payload.mode_paiement)
            .unwrap_or_else(|| state.config.company.default_payment_mode.clone()),
        statut: text(payload.statut).unwrap_or_else(|| DEFAULT_INVOICE_STATUS.to_string()),
    };

    let stored = with_storage(&state, move |storage| storage.create_invoice(&invoice)).await?;
    tracing::info!(
        id = stored.id,
        numero = %stored.numero_facture,
        total = stored.total,
        "invoice created"
    );
    Ok(Json(stored))
}

pub async fn update(
    State(state): State<AppState>,
    JsonBody(mut payload): JsonBody<InvoicePayload>,
) -> Result<Json<Invoice>> {
    let id = non_zero_id(payload.id).ok_or_else(|| Error::missing_fields("ID manquant"))?;
    let patch = InvoicePatch {
        lines: payload.lines()?,
        client_nom: text(payload.client_nom),
        client_telephone: text(payload.client_telephone),
        client_adresse: text(payload.client_adresse),
        mode_paiement: text(payload.mode_paiement),
        statut: text(payload.statut),
    };

    let stored = with_storage(&state, move |storage| storage.update_invoice(id, patch)).await?;
    Ok(Json(stored))
}

pub async fn remove(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<Json<Value>> {
    let id = query.require("ID manquant")?;
    let deleted = with_storage(&state, move |storage| storage.delete_invoice(id)).await?;
    tracing::info!(id, numero = %deleted.numero_facture, "invoice deleted");
    Ok(Json(json!({ "success": true })))
}

pub async fn pdf(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<impl IntoResponse> {
    let id = parse_id(&raw_id)?;
    let config = Arc::clone(&state.config);

    let (numero, bytes) = with_storage(&state, move |storage| {
        let invoice = storage
            .get_invoice(id)?
            .ok_or_else(|| Error::not_found("Facture introuvable"))?;
        let bytes = pdf::render_invoice(&invoice, &config.company)?;
        Ok((invoice.numero_facture, bytes))
    })
    .await?;

    tracing::debug!(id, numero = %numero, size = bytes.len(), "rendered invoice PDF");
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=facture-{numero}.pdf"),
            ),
        ],
        bytes,
    ))
}
