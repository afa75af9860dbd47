use axum::extract::State;
use axum::Json;

use super::{with_storage, AppState};
use crate::error::Result;
use crate::storage::{Dashboard, DASHBOARD_RECENT_LIMIT};

pub async fn show(State(state): State<AppState>) -> Result<Json<Dashboard>> {
    let dashboard =
        with_storage(&state, |storage| storage.dashboard(DASHBOARD_RECENT_LIMIT)).await?;
    Ok(Json(dashboard))
}
