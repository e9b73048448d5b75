//! Report API Module

mod handler;

use axum::{routing::get, Router};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/reports", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/due/{payday}", get(handler::due_on))
        .route("/paydays", get(handler::paydays))
        .route("/conflicts", get(handler::conflicts))
}
