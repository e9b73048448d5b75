//! Persisted order and line-item rows
//!
//! Monetary fields are stored as `f64` rounded to 2 decimal places at
//! commit; all intermediate arithmetic happens in `Decimal` on the server
//! side. Rows are never deleted, only status-transitioned.

use super::status::{ItemStatus, OrderStatus};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One benefit order row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// `ORD-<year>-<seq:04>`, assigned by the id generator
    pub order_id: String,
    pub employee_id: String,
    /// Employee name snapshot (for payroll views and audit)
    pub employee_name: String,
    pub location: String,
    pub order_date: NaiveDate,
    /// Derived: sum of non-cancelled line totals
    pub total_amount: f64,
    /// 1-3 payroll installments, or 0 for cash (no deduction)
    pub payment_plan: u8,
    pub amount_per_installment: f64,
    /// Set once items are received, for deduction orders only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_deduction_date: Option<NaiveDate>,
    pub installments_paid: u8,
    pub amount_paid: f64,
    pub amount_remaining: f64,
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_by: String,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    /// Order this one was split off from, when created by a partial receive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_order_id: Option<String>,
}

impl Order {
    /// Whether this order is collected via payroll deduction
    pub fn is_deducted(&self) -> bool {
        self.payment_plan > 0
    }

    /// Whether the employee settles in cash (no deduction schedule)
    pub fn is_cash(&self) -> bool {
        self.payment_plan == 0
    }
}

/// One catalog item within an order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    /// `LINE-<seq:06>`, assigned by the id generator
    pub line_id: String,
    /// Owning order reference (reassigned when an order is split)
    pub order_id: String,
    pub item_id: String,
    pub item_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub quantity: i32,
    /// 0 when `is_replacement`
    pub unit_price: f64,
    /// `unit_price * quantity`, rounded to cents
    pub line_total: f64,
    /// Replacement items are always zero-cost
    #[serde(default)]
    pub is_replacement: bool,
    #[serde(default)]
    pub received_flag: bool,
    #[serde(default)]
    pub received_quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_by: Option<String>,
    pub item_status: ItemStatus,
    /// Line this one was split off from, for split lineage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_line_id: Option<String>,
}

impl LineItem {
    pub fn is_cancelled(&self) -> bool {
        self.item_status == ItemStatus::Cancelled
    }
}
