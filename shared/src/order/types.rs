//! Request DTOs and payroll report rows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One requested catalog item, before pricing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemInput {
    /// Catalog item name (resolved to id + price by the catalog service)
    pub item_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub quantity: i32,
    /// Replacements are priced at 0 regardless of catalog price
    #[serde(default)]
    pub is_replacement: bool,
}

/// Order intake request (employee self-service or manager entry)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub employee_id: String,
    /// Overrides the directory's location when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub items: Vec<LineItemInput>,
    /// 1-3 payroll installments, or 0 for cash
    pub payment_plan: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Received quantity for one line, used by partial receive / cash conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceivedLine {
    pub line_id: String,
    pub received_quantity: i32,
}

/// Result of a receive operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiveOutcome {
    /// The original order after the receive committed
    pub order: super::Order,
    /// Remainder order created for unreceived items, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remainder_order_id: Option<String>,
}

/// One deduction due on a payday
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DueOrder {
    pub order_id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub amount: f64,
    pub is_final_installment: bool,
}

/// Everything payroll must collect on one payday
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuePayrollReport {
    pub payday: NaiveDate,
    pub orders: Vec<DueOrder>,
    pub total_amount: f64,
    pub employee_count: usize,
}
