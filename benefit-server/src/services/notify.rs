//! Lifecycle notifications
//!
//! Notifications are advisory. Delivery failure must never fail the
//! operation that triggered it, so implementations are infallible and the
//! default sink just logs at info level.

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notify {
    /// An order was taken in
    OrderCreated {
        order_id: String,
        employee_id: String,
        total_amount: f64,
    },
    /// Payroll deductions were scheduled for a received order
    DeductionScheduled {
        order_id: String,
        employee_id: String,
        first_deduction_date: chrono::NaiveDate,
        amount_per_installment: f64,
        installments: u8,
    },
    /// An order was split; the remainder is still awaiting items
    OrderSplit {
        order_id: String,
        remainder_order_id: String,
    },
    /// A deduction order finished collecting
    OrderSettled { order_id: String, employee_id: String },
    /// An order was cancelled
    OrderCancelled { order_id: String, cancelled_by: String },
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: Notify);
}

/// Default sink: structured log line per event
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: Notify) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(target: "notify", "{payload}"),
            Err(e) => info!(target: "notify", "unserializable event: {e}"),
        }
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records events for assertions
    #[derive(Clone, Default)]
    pub struct RecordingNotifier {
        pub events: Arc<Mutex<Vec<Notify>>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, event: Notify) {
            self.events.lock().push(event);
        }
    }
}
