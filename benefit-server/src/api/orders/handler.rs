//! Order API Handlers

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::order::{CreateOrderRequest, LineItem, Order, ReceiveOutcome, ReceivedLine};

use crate::audit_log;
use crate::common::{ok, AppError, AppResponse};
use crate::core::AppState;
use crate::orders::RepairReport;

/// Mutations carry the acting user; there is no session layer in front
/// of this service.
#[derive(Debug, Deserialize)]
pub struct ActorPayload {
    pub actor: String,
    /// Defaults to today; accepted for back-dated receiving
    #[serde(default)]
    pub date: Option<chrono::NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePayload {
    pub actor: String,
    #[serde(flatten)]
    pub request: CreateOrderRequest,
}

#[derive(Debug, Deserialize)]
pub struct ReceivePayload {
    pub actor: String,
    #[serde(default)]
    pub date: Option<chrono::NaiveDate>,
    pub received: Vec<ReceivedLine>,
}

#[derive(Debug, Deserialize)]
pub struct CancelPayload {
    pub actor: String,
    #[serde(default)]
    pub admin: bool,
}

#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<LineItem>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreatePayload>,
) -> Result<Json<AppResponse<Order>>, AppError> {
    let order = state
        .engine
        .create_order(payload.request, &payload.actor, shared::util::today())?;
    audit_log!(
        payload.actor.as_str(),
        "create",
        format!("order:{}", order.order_id).as_str()
    );
    Ok(ok(order))
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<OrderDetail>>, AppError> {
    let order = state
        .engine
        .store()
        .get_order(&id)?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let lines = state.engine.store().lines_for_order(&id)?;
    Ok(ok(OrderDetail { order, lines }))
}

pub async fn receive(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ActorPayload>,
) -> Result<Json<AppResponse<Order>>, AppError> {
    let date = payload.date.unwrap_or_else(shared::util::today);
    let order = state.engine.mark_received(&id, &payload.actor, date)?;
    audit_log!(
        payload.actor.as_str(),
        "receive",
        format!("order:{id}").as_str()
    );
    Ok(ok(order))
}

pub async fn receive_partial(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ReceivePayload>,
) -> Result<Json<AppResponse<ReceiveOutcome>>, AppError> {
    let date = payload.date.unwrap_or_else(shared::util::today);
    let outcome = state
        .engine
        .receive_partial(&id, payload.received, &payload.actor, date)?;
    audit_log!(
        payload.actor.as_str(),
        "receive_partial",
        format!("order:{id}").as_str(),
        format!("remainder:{:?}", outcome.remainder_order_id).as_str()
    );
    Ok(ok(outcome))
}

pub async fn convert_cash(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ReceivePayload>,
) -> Result<Json<AppResponse<ReceiveOutcome>>, AppError> {
    let date = payload.date.unwrap_or_else(shared::util::today);
    let outcome = state
        .engine
        .convert_to_cash(&id, payload.received, &payload.actor, date)?;
    audit_log!(
        payload.actor.as_str(),
        "convert_cash",
        format!("order:{id}").as_str()
    );
    Ok(ok(outcome))
}

pub async fn record_payment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ActorPayload>,
) -> Result<Json<AppResponse<Order>>, AppError> {
    let order = state.engine.record_installment(&id, &payload.actor)?;
    audit_log!(
        payload.actor.as_str(),
        "payment",
        format!("order:{id}").as_str(),
        format!("installment:{}", order.installments_paid).as_str()
    );
    Ok(ok(order))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<CancelPayload>,
) -> Result<Json<AppResponse<Order>>, AppError> {
    let order = state
        .engine
        .cancel_order(&id, &payload.actor, payload.admin)?;
    audit_log!(
        payload.actor.as_str(),
        "cancel",
        format!("order:{id}").as_str()
    );
    Ok(ok(order))
}

/// Administrative maintenance: recompute or clear first deduction dates
/// across all committed orders.
pub async fn repair_dates(
    State(state): State<AppState>,
    Json(payload): Json<ActorPayload>,
) -> Result<Json<AppResponse<RepairReport>>, AppError> {
    let report =
        crate::orders::repair_deduction_dates(state.engine.store(), state.engine.calendar())?;
    audit_log!(
        payload.actor.as_str(),
        "repair_dates",
        format!(
            "recomputed:{} cleared:{}",
            report.recomputed.len(),
            report.cleared.len()
        )
        .as_str()
    );
    Ok(ok(report))
}
