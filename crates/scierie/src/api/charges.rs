use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::input::{
    self, non_zero, non_zero_id, optional_date, text, IdQuery, JsonBody, QueryParams,
};
use super::{with_storage, AppState};
use crate::error::{Error, Result};
use crate::model::{Charge, ChargePatch, NewCharge};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChargePayload {
    #[serde(deserialize_with = "input::id")]
    id: Option<i64>,
    date: Option<String>,
    fournisseur: Option<String>,
    #[serde(deserialize_with = "input::number")]
    quantite: Option<f64>,
    #[serde(deserialize_with = "input::number")]
    poids: Option<f64>,
    #[serde(deserialize_with = "input::number")]
    prix: Option<f64>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Charge>>> {
    let charges = with_storage(&state, |storage| storage.list_charges()).await?;
    Ok(Json(charges))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ChargePayload>,
) -> Result<(StatusCode, Json<Charge>)> {
    let (Some(date), Some(fournisseur), Some(quantite), Some(poids), Some(prix)) = (
        optional_date(payload.date)?,
        text(payload.fournisseur),
        non_zero(payload.quantite),
        non_zero(payload.poids),
        non_zero(payload.prix),
    ) else {
        return Err(Error::missing_fields(
            "Champs manquants pour créer une charge",
        ));
    };
    let charge = NewCharge {
        date,
        fournisseur,
        quantite,
        poids,
        prix,
    };

    let stored = with_storage(&state, move |storage| storage.create_charge(&charge)).await?;
    tracing::info!(id = stored.id, fournisseur = %stored.fournisseur, prix = stored.prix, "charge recorded");
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn update(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ChargePayload>,
) -> Result<Json<Charge>> {
    let id = non_zero_id(payload.id).ok_or_else(|| Error::missing_fields("ID manquant"))?;
    let patch = ChargePatch {
        date: optional_date(payload.date)?,
        fournisseur: text(payload.fournisseur),
        quantite: non_zero(payload.quantite),
        poids: non_zero(payload.poids),
        prix: non_zero(payload.prix),
    };

    let stored = with_storage(&state, move |storage| storage.update_charge(id, patch)).await?;
    Ok(Json(stored))
}

pub async fn remove(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<Json<Value>> {
    let id = query.require("ID manquant")?;
    with_storage(&state, move |storage| storage.delete_charge(id)).await?;
    tracing::info!(id, "charge deleted");
    Ok(Json(json!({ "success": true })))
}
