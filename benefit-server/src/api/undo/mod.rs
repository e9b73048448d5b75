//! Undo API Module

mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/undo", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{action_id}", post(handler::undo))
}
