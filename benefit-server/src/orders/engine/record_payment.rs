//! Installment payment recording
//!
//! One call per payroll deduction. The final installment zeroes the
//! remaining balance outright so per-installment rounding drift never
//! leaves a few cents on a completed order.

use shared::order::{ActionType, Order, OrderStatus};
use tracing::info;

use crate::orders::error::{OrderError, OrderResult};
use crate::orders::money;
use crate::services::Notify;

use super::OrderEngine;

impl OrderEngine {
    pub fn record_installment(&self, order_id: &str, actor: &str) -> OrderResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self.load_order(&txn, order_id)?;

        if order.status != OrderStatus::Active {
            return Err(OrderError::NotDue(
                order.order_id.clone(),
                format!("status is {}", order.status),
            ));
        }
        if order.installments_paid >= order.payment_plan {
            return Err(OrderError::NotDue(
                order.order_id.clone(),
                "all installments already recorded".to_string(),
            ));
        }

        let before = vec![self.capture(&txn, &order)?];

        order.installments_paid += 1;
        if order.installments_paid == order.payment_plan {
            // Final installment absorbs rounding drift
            order.amount_paid = order.total_amount;
            order.amount_remaining = 0.0;
            order.status = OrderStatus::Completed;
        } else {
            order.amount_paid = money::to_f64(
                money::to_decimal(order.amount_paid)
                    + money::to_decimal(order.amount_per_installment),
            );
            order.amount_remaining = money::to_f64(
                money::to_decimal(order.total_amount) - money::to_decimal(order.amount_paid),
            );
        }
        self.store.put_order(&txn, &order)?;

        let after = vec![self.capture(&txn, &order)?];
        self.record_action(
            &txn,
            actor,
            ActionType::PaymentRecorded,
            format!(
                "installment {}/{} recorded on {order_id}",
                order.installments_paid, order.payment_plan
            ),
            vec![order.order_id.clone()],
            before,
            after,
        )?;
        txn.commit()
            .map_err(crate::orders::storage::StorageError::from)?;

        info!(
            order_id = %order.order_id,
            installment = order.installments_paid,
            remaining = order.amount_remaining,
            "installment recorded"
        );
        if order.status == OrderStatus::Completed {
            self.notifier.notify(Notify::OrderSettled {
                order_id: order.order_id.clone(),
                employee_id: order.employee_id.clone(),
            });
        }
        Ok(order)
    }
}
