//! Order and line-item status enums
//!
//! Statuses are real enums with an explicit transition predicate, so the
//! lifecycle rules live in one place instead of string comparisons spread
//! across operations.

use serde::{Deserialize, Serialize};

/// Order status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Awaiting delivery; will be collected via payroll deduction
    #[default]
    Pending,
    /// Awaiting delivery; employee pays cash at the store
    PendingCash,
    /// Nothing to collect (zero-cost order, or settled in cash at the store)
    StorePaid,
    /// Items received; deduction schedule running
    Active,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Terminal states are never left
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    /// States from which a full receive is legal
    pub fn is_receivable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::StorePaid)
    }

    /// States from which the employee may withdraw their own request
    pub fn is_employee_cancellable(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::PendingCash)
    }

    /// Whether `next` is a legal transition from this status
    pub fn can_become(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        match self {
            Pending => matches!(next, Active | StorePaid | Completed | Cancelled),
            PendingCash => matches!(next, Completed | Cancelled),
            StorePaid => matches!(next, Completed | Cancelled),
            Active => matches!(next, Completed | Cancelled),
            Completed | Cancelled => false,
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::Pending => write!(f, "PENDING"),
            OrderStatus::PendingCash => write!(f, "PENDING_CASH"),
            OrderStatus::StorePaid => write!(f, "STORE_PAID"),
            OrderStatus::Active => write!(f, "ACTIVE"),
            OrderStatus::Completed => write!(f, "COMPLETED"),
            OrderStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Line-item status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    #[default]
    Pending,
    Received,
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_have_no_outgoing_transitions() {
        for next in [
            OrderStatus::Pending,
            OrderStatus::Active,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert!(!OrderStatus::Completed.can_become(next));
            assert!(!OrderStatus::Cancelled.can_become(next));
        }
    }

    #[test]
    fn pending_can_activate_but_pending_cash_cannot() {
        assert!(OrderStatus::Pending.can_become(OrderStatus::Active));
        assert!(!OrderStatus::PendingCash.can_become(OrderStatus::Active));
        assert!(OrderStatus::PendingCash.can_become(OrderStatus::Completed));
    }

    #[test]
    fn receivable_states() {
        assert!(OrderStatus::Pending.is_receivable());
        assert!(OrderStatus::StorePaid.is_receivable());
        assert!(!OrderStatus::PendingCash.is_receivable());
        assert!(!OrderStatus::Active.is_receivable());
    }
}
