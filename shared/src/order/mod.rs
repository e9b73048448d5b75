//! Benefit order data model
//!
//! - **status**: order/line status enums with explicit transition rules
//! - **record**: persisted order and line-item rows
//! - **ledger**: undo ledger action snapshots
//! - **types**: request DTOs and payroll report rows

pub mod ledger;
pub mod record;
pub mod status;
pub mod types;

// Re-exports
pub use ledger::{ActionSnapshot, ActionType, LineStateSnapshot, OrderStateSnapshot};
pub use record::{LineItem, Order};
pub use status::{ItemStatus, OrderStatus};
pub use types::*;
