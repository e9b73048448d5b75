//! Undo ledger entries
//!
//! An [`ActionSnapshot`] captures full before/after state around a
//! lifecycle-mutating operation. Undo is a verbatim snapshot-restore, not
//! a computed inverse: operations like a partial receive create new rows
//! and are not cleanly invertible, so the ledger carries the complete
//! mutable field set per affected order.

use super::status::{ItemStatus, OrderStatus};
use super::record::{LineItem, Order};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which lifecycle operation produced a ledger entry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    OrderReceived,
    OrderSplit,
    CashConverted,
    PaymentRecorded,
    OrderCancelled,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::OrderReceived => write!(f, "ORDER_RECEIVED"),
            ActionType::OrderSplit => write!(f, "ORDER_SPLIT"),
            ActionType::CashConverted => write!(f, "CASH_CONVERTED"),
            ActionType::PaymentRecorded => write!(f, "PAYMENT_RECORDED"),
            ActionType::OrderCancelled => write!(f, "ORDER_CANCELLED"),
        }
    }
}

/// Mutable fields of one line item at capture time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineStateSnapshot {
    pub line_id: String,
    /// Captured because splits reassign lines between orders
    pub order_id: String,
    pub quantity: i32,
    pub unit_price: f64,
    pub line_total: f64,
    pub received_flag: bool,
    pub received_quantity: i32,
    pub received_date: Option<NaiveDate>,
    pub received_by: Option<String>,
    pub item_status: ItemStatus,
}

impl From<&LineItem> for LineStateSnapshot {
    fn from(line: &LineItem) -> Self {
        Self {
            line_id: line.line_id.clone(),
            order_id: line.order_id.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
            line_total: line.line_total,
            received_flag: line.received_flag,
            received_quantity: line.received_quantity,
            received_date: line.received_date,
            received_by: line.received_by.clone(),
            item_status: line.item_status,
        }
    }
}

/// Mutable fields of one order (plus its lines) at capture time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderStateSnapshot {
    pub order_id: String,
    pub status: OrderStatus,
    pub total_amount: f64,
    pub payment_plan: u8,
    pub amount_per_installment: f64,
    pub installments_paid: u8,
    pub amount_paid: f64,
    pub amount_remaining: f64,
    pub first_deduction_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub lines: Vec<LineStateSnapshot>,
}

impl OrderStateSnapshot {
    pub fn capture(order: &Order, lines: &[LineItem]) -> Self {
        Self {
            order_id: order.order_id.clone(),
            status: order.status,
            total_amount: order.total_amount,
            payment_plan: order.payment_plan,
            amount_per_installment: order.amount_per_installment,
            installments_paid: order.installments_paid,
            amount_paid: order.amount_paid,
            amount_remaining: order.amount_remaining,
            first_deduction_date: order.first_deduction_date,
            received_date: order.received_date,
            lines: lines.iter().map(LineStateSnapshot::from).collect(),
        }
    }
}

/// One undo ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSnapshot {
    pub action_id: String,
    /// Unix milliseconds
    pub timestamp: i64,
    pub actor: String,
    pub action_type: ActionType,
    pub description: String,
    pub affected_order_ids: Vec<String>,
    pub before_state: Vec<OrderStateSnapshot>,
    pub after_state: Vec<OrderStateSnapshot>,
    /// Unix milliseconds; undo is refused past this point
    pub expires_at: i64,
    #[serde(default)]
    pub undone: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undone_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub undone_by: Option<String>,
}

impl ActionSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        actor: String,
        action_type: ActionType,
        description: String,
        affected_order_ids: Vec<String>,
        before_state: Vec<OrderStateSnapshot>,
        after_state: Vec<OrderStateSnapshot>,
        now: i64,
        window_ms: i64,
    ) -> Self {
        Self {
            action_id: uuid::Uuid::new_v4().to_string(),
            timestamp: now,
            actor,
            action_type,
            description,
            affected_order_ids,
            before_state,
            after_state,
            expires_at: now + window_ms,
            undone: false,
            undone_at: None,
            undone_by: None,
        }
    }

    /// Whether the entry is still eligible for undo at `now`
    pub fn is_undoable_at(&self, now: i64) -> bool {
        !self.undone && now < self.expires_at
    }
}
