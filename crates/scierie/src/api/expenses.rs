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
use crate::model::{Expense, ExpensePatch, NewExpense};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExpensePayload {
    #[serde(deserialize_with = "input::id")]
    id: Option<i64>,
    date: Option<String>,
    categorie: Option<String>,
    #[serde(deserialize_with = "input::number")]
    montant: Option<f64>,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Expense>>> {
    let expenses = with_storage(&state, |storage| storage.list_expenses()).await?;
    Ok(Json(expenses))
}

pub async fn create(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ExpensePayload>,
) -> Result<(StatusCode, Json<Expense>)> {
    let (Some(date), Some(categorie), Some(montant)) = (
        optional_date(payload.date)?,
        text(payload.categorie),
        non_zero(payload.montant),
    ) else {
        return Err(Error::missing_fields(
            "Champs manquants : date, catégorie ou montant.",
        ));
    };
    let expense = NewExpense {
        date,
        categorie,
        montant,
    };

    let stored = with_storage(&state, move |storage| storage.create_expense(&expense)).await?;
    tracing::info!(id = stored.id, categorie = %stored.categorie, montant = stored.montant, "expense recorded");
    Ok((StatusCode::CREATED, Json(stored)))
}

pub async fn update(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ExpensePayload>,
) -> Result<Json<Expense>> {
    let id = non_zero_id(payload.id).ok_or_else(|| Error::missing_fields("ID manquant"))?;
    let patch = ExpensePatch {
        date: optional_date(payload.date)?,
        categorie: text(payload.categorie),
        montant: non_zero(payload.montant),
    };

    let stored = with_storage(&state, move |storage| storage.update_expense(id, patch)).await?;
    Ok(Json(stored))
}

pub async fn remove(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<IdQuery>,
) -> Result<Json<Value>> {
    let id = query.require("ID manquant")?;
    with_storage(&state, move |storage| storage.delete_expense(id)).await?;
    tracing::info!(id, "expense deleted");
    Ok(Json(json!({ "success": true })))
}
