//! Order cancellation
//!
//! Employees may withdraw their own request while nothing has shipped;
//! administrators may cancel any non-terminal order. Cancellation cascades
//! to every line that has not been received.

use shared::order::{ActionType, ItemStatus, Order, OrderStatus};
use tracing::info;

use crate::orders::error::{OrderError, OrderResult};
use crate::services::Notify;

use super::OrderEngine;

impl OrderEngine {
    pub fn cancel_order(&self, order_id: &str, actor: &str, admin: bool) -> OrderResult<Order> {
        let txn = self.store.begin_write()?;
        let mut order = self.load_order(&txn, order_id)?;

        let legal = if admin {
            !order.status.is_terminal()
        } else {
            order.status.is_employee_cancellable()
        };
        if !legal {
            return Err(OrderError::invalid_state(
                &order.order_id,
                order.status,
                "cancel",
            ));
        }

        let before = vec![self.capture(&txn, &order)?];

        order.status = OrderStatus::Cancelled;
        self.store.put_order(&txn, &order)?;
        for mut line in self.store.lines_for_order_txn(&txn, order_id)? {
            if !line.received_flag && line.item_status != ItemStatus::Cancelled {
                line.item_status = ItemStatus::Cancelled;
                self.store.put_line(&txn, &line, None)?;
            }
        }

        let after = vec![self.capture(&txn, &order)?];
        self.record_action(
            &txn,
            actor,
            ActionType::OrderCancelled,
            format!("order {order_id} cancelled by {actor}"),
            vec![order.order_id.clone()],
            before,
            after,
        )?;
        txn.commit()
            .map_err(crate::orders::storage::StorageError::from)?;

        info!(order_id = %order.order_id, admin, "order cancelled");
        self.notifier.notify(Notify::OrderCancelled {
            order_id: order.order_id.clone(),
            cancelled_by: actor.to_string(),
        });
        Ok(order)
    }
}
