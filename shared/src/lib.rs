//! Shared types for the uniform benefit order service
//!
//! Common types used by the server and by reporting/view consumers:
//! order and line-item records, status enums, undo ledger snapshots,
//! payroll report rows, and request DTOs.

pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use order::{
    ActionSnapshot, ActionType, DueOrder, DuePayrollReport, ItemStatus, LineItem, LineItemInput,
    LineStateSnapshot, Order, OrderStateSnapshot, OrderStatus,
};
