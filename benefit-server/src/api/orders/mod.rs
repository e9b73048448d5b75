//! Order API Module
//!
//! Every mutation goes through the lifecycle engine; reads hit committed
//! storage directly.

mod handler;

use axum::{
    routing::{get, post},
    Router,
};

use crate::core::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/receive", post(handler::receive))
        .route("/{id}/receive-partial", post(handler::receive_partial))
        .route("/{id}/convert-cash", post(handler::convert_cash))
        .route("/{id}/payments", post(handler::record_payment))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/repair-dates", post(handler::repair_dates))
}
