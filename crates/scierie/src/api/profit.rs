use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use super::{with_storage, AppState};
use crate::error::Result;
use crate::model::{ProfitPoint, ProfitSummary};

/// Recompute the summary and return the net profit.
pub async fn current(State(state): State<AppState>) -> Result<Json<Value>> {
    let summary = with_storage(&state, |storage| storage.recompute_profit()).await?;
    Ok(Json(json!({ "benefice": summary.benefice_net })))
}

/// The stored summary row. Every mutation of the source tables keeps it current.
pub async fn summary(State(state): State<AppState>) -> Result<Json<ProfitSummary>> {
    let summary = with_storage(&state, |storage| storage.profit_summary()).await?;
    Ok(Json(summary))
}

pub async fn history(State(state): State<AppState>) -> Result<Json<Vec<ProfitPoint>>> {
    let points = with_storage(&state, |storage| storage.profit_history()).await?;
    Ok(Json(points))
}
