//! Health API Handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::common::{ok, AppError, AppResponse};
use crate::core::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: &'static str,
    pub environment: String,
    /// Advisory findings from the conflict audit
    pub conflicts: usize,
}

pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<AppResponse<Health>>, AppError> {
    let findings = state.conflicts.scan()?;
    Ok(ok(Health {
        status: "ok",
        environment: state.config.environment.clone(),
        conflicts: findings.len(),
    }))
}
