//! Report API Handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use shared::order::DuePayrollReport;

use crate::common::{ok, AppError, AppResponse};
use crate::core::AppState;
use crate::orders::ConflictFinding;

pub async fn due_on(
    State(state): State<AppState>,
    Path(payday): Path<chrono::NaiveDate>,
) -> Result<Json<AppResponse<DuePayrollReport>>, AppError> {
    Ok(ok(state.schedule.due_on(payday)?))
}

#[derive(Debug, Deserialize)]
pub struct PaydaysQuery {
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_history")]
    pub history: usize,
}

fn default_count() -> usize {
    6
}

fn default_history() -> usize {
    2
}

pub async fn paydays(
    State(state): State<AppState>,
    Query(query): Query<PaydaysQuery>,
) -> Result<Json<AppResponse<Vec<chrono::NaiveDate>>>, AppError> {
    Ok(ok(state
        .schedule
        .paydays(shared::util::today(), query.history, query.count)))
}

pub async fn conflicts(
    State(state): State<AppState>,
) -> Result<Json<AppResponse<Vec<ConflictFinding>>>, AppError> {
    Ok(ok(state.conflicts.scan()?))
}
