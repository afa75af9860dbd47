use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::input::{self, non_zero, text, JsonBody};
use super::{with_storage, AppState};
use crate::error::{Error, Result};
use crate::model::{NewSale, Sale};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SalePayload {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(deserialize_with = "input::number")]
    quantity: Option<f64>,
    #[serde(deserialize_with = "input::number")]
    unit_price: Option<f64>,
    unite: Option<String>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Sale>>> {
    let sales = with_storage(&state, |storage| storage.list_sales()).await?;
    Ok(Json(sales))
}

pub async fn record(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SalePayload>,
) -> Result<Json<Value>> {
    let (Some(kind), Some(quantity), Some(unit_price)) = (
        text(payload.kind),
        non_zero(payload.quantity),
        non_zero(payload.unit_price),
    ) else {
        return Err(Error::missing_fields("Champs manquants"));
    };
    let sale = NewSale {
        kind,
        quantity,
        unit_price,
        unite: text(payload.unite),
    };

    let vente = with_storage(&state, move |storage| storage.record_sale(&sale)).await?;
    Ok(Json(json!({
        "success": true,
        "message": "✅ Vente enregistrée et stock mis à jour.",
        "vente": vente,
    })))
}
