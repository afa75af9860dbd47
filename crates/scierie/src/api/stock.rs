use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::input::{self, non_zero, non_zero_id, text, IdQuery, JsonBody, QueryParams};
use super::{with_storage, AppState};
use crate::error::{Error, Result};
use crate::model::{NewStockItem, StockItem};

const MISSING_FIELDS: &str = "Champs manquants";
const MISSING_ID: &str = "ID manquant";

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StockPayload {
    #[serde(deserialize_with = "input::id")]
    id: Option<i64>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(deserialize_with = "input::number")]
    quantity: Option<f64>,
    #[serde(deserialize_with = "input::number")]
    unit_price: Option<f64>,
}

impl StockPayload {
    fn into_item(self) -> Option<NewStockItem> {
        Some(NewStockItem {
            kind: text(self.kind)?,
            quantity: non_zero(self.quantity)?,
            unit_price: non_zero(self.unit_price)?,
        })
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<StockItem>>> {
    let items = with_storage(&state, |storage| storage.list_stock()).await?;
    Ok(Json(items))
}

pub async fn upsert(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<StockPayload>,
) -> Result<Json<StockItem>> {
    let item = payload
        .into_item()
        .ok_or_else(|| Error::missing_fields(MISSING_FIELDS))?;

    let stored = with_storage(&state, move |storage| storage.upsert_stock(&item)).await?;
    tracing::info!(id = stored.id, kind = %stored.kind, quantity = stored.quantity, "stock saved");
    Ok(Json(stored))
}

pub async fn update(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<StockPayload>,
) -> Result<Json<StockItem>> {
    let id = non_zero_id(payload.id).ok_or_else(|| Error::missing_fields(MISSING_FIELDS))?;
    let item = payload
        .into_item()
        .ok_or_else(|| Error::missing_fields(MISSING_FIELDS))?;

    let stored = with_storage(&state, move |storage| storage.update_stock(id, &item)).await?;
    Ok(Json(stored))
}

pub async fn remove(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<Json<Value>> {
    let id = query.require(MISSING_ID)?;
    let deleted = with_storage(&state, move |storage| storage.delete_stock(id)).await?;
    tracing::info!(id, "stock deleted");
    Ok(Json(json!({ "success": true, "deleted": deleted })))
}
