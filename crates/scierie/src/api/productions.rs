use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::input::{self, non_zero, non_zero_id, text, IdQuery, JsonBody, QueryParams};
use super::{with_storage, AppState};
use crate::error::{Error, Result};
use crate::model::{NewProduction, Production};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductionPayload {
    #[serde(deserialize_with = "input::id")]
    id: Option<i64>,
    type_bois: Option<String>,
    #[serde(deserialize_with = "input::number")]
    quantity: Option<f64>,
    #[serde(deserialize_with = "input::number")]
    unit_price: Option<f64>,
}

impl ProductionPayload {
    fn into_production(self) -> Option<NewProduction> {
        Some(NewProduction {
            type_bois: text(self.type_bois)?,
            quantity: non_zero(self.quantity)?,
            unit_price: non_zero(self.unit_price)?,
        })
    }
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Production>>> {
    let productions = with_storage(&state, |storage| storage.list_productions()).await?;
    Ok(Json(productions))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ProductionPayload>,
) -> Result<(StatusCode, Json<Production>)> {
    let production = payload.into_production().ok_or_else(|| {
        Error::missing_fields("Champs manquants : typeBois, quantity ou unitPrice")
    })?;

    let stored =
        with_storage(&state, move |storage| storage.create_production(&production)).await?;
    tracing::info!(id = stored.id, type_bois = %stored.type_bois, total = stored.total, "production recorded");
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn update(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ProductionPayload>,
) -> Result<Json<Production>> {
    let missing = || Error::missing_fields("Champs manquants : id, typeBois, quantity ou unitPrice");
    let id = non_zero_id(payload.id).ok_or_else(missing)?;
    let production = payload.into_production().ok_or_else(missing)?;

    let stored = with_storage(&state, move |storage| {
        storage.update_production(id, &production)
    })
    .await?;
    Ok(Json(stored))
}

pub async fn remove(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<Json<Value>> {
    let id = query.require("ID manquant pour la suppression")?;
    with_storage(&state, move |storage| storage.delete_production(id)).await?;
    tracing::info!(id, "production deleted");
    Ok(Json(json!({ "message": "Production supprimée avec succès" })))
}
