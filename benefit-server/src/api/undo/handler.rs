//! Undo API Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::order::ActionSnapshot;

use crate::audit_log;
use crate::common::{ok, AppError, AppResponse};
use crate::core::AppState;

/// Ledger entry plus its current undoability, for the audit view
#[derive(Debug, Serialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub action: ActionSnapshot,
    pub undoable: bool,
}

pub async fn list(
    State(state): State<AppState>,
) -> Result<Json<AppResponse<Vec<LedgerEntry>>>, AppError> {
    let now = shared::util::now_millis();
    let entries = state
        .engine
        .list_actions()?
        .into_iter()
        .map(|action| LedgerEntry {
            undoable: action.is_undoable_at(now),
            action,
        })
        .collect();
    Ok(ok(entries))
}

#[derive(Debug, Deserialize)]
pub struct UndoPayload {
    pub actor: String,
}

pub async fn undo(
    State(state): State<AppState>,
    Path(action_id): Path<String>,
    Json(payload): Json<UndoPayload>,
) -> Result<Json<AppResponse<ActionSnapshot>>, AppError> {
    let entry = state.engine.undo_action(&action_id, &payload.actor)?;
    audit_log!(
        payload.actor.as_str(),
        "undo",
        format!("action:{action_id}").as_str(),
        entry.description.as_str()
    );
    Ok(ok(entry))
}
