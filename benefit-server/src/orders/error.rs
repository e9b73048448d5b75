//! Order engine error taxonomy

use shared::order::OrderStatus;
use thiserror::Error;

use super::storage::StorageError;

#[derive(Debug, Error)]
pub enum OrderError {
    /// Input rejected before any state change
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The order exists but its status forbids the requested operation
    #[error("Order {order_id} is {status}, cannot {operation}")]
    InvalidState {
        order_id: String,
        status: OrderStatus,
        operation: String,
    },

    /// A partial receive that marked nothing received
    #[error("Nothing received on order {0}")]
    NothingReceived(String),

    /// A payment recorded against an order with no installment due
    #[error("No installment due on order {0}: {1}")]
    NotDue(String, String),

    /// Id generation could not acquire the sequence lock in time. Retryable.
    #[error("Timed out waiting for the id sequence lock")]
    LockTimeout,

    /// Undo requested on an entry outside the window or already undone
    #[error("Action {0} is not undoable: {1}")]
    NotUndoable(String, String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Line item not found: {0}")]
    LineNotFound(String),

    #[error("Unknown employee: {0}")]
    UnknownEmployee(String),

    #[error("Unknown catalog item: {0}")]
    UnknownItem(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type OrderResult<T> = Result<T, OrderError>;

impl OrderError {
    pub fn invalid_state(order_id: &str, status: OrderStatus, operation: &str) -> Self {
        Self::InvalidState {
            order_id: order_id.to_string(),
            status,
            operation: operation.to_string(),
        }
    }
}
