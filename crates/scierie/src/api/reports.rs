use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::input::QueryParams;
use super::{with_storage, AppState};
use crate::error::Result;
use crate::report::{build_report, parse_report_date, Period, Report, ReportKind};

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    period: Option<String>,
    date: Option<String>,
}

pub async fn show(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ReportQuery>,
) -> Result<Json<Report>> {
    let kind = ReportKind::parse(query.kind.as_deref())?;
    let period = Period::parse(query.period.as_deref())?;
    let date = parse_report_date(query.date.as_deref(), Utc::now().date_naive())?;

    tracing::debug!(?kind, ?period, %date, "building report");
    let report =
        with_storage(&state, move |storage| build_report(storage, kind, period, date)).await?;
    Ok(Json(report))
}
