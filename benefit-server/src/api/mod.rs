//! API routes
//!
//! # Structure
//!
//! - [`health`] - liveness and startup checks
//! - [`orders`] - order lifecycle operations
//! - [`reports`] - payroll due reports, paydays and the conflict audit
//! - [`undo`] - ledger listing and snapshot-restore

pub mod health;
pub mod orders;
pub mod reports;
pub mod undo;

use axum::Router;

use crate::core::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(reports::router())
        .merge(undo::router())
        .with_state(state)
}
