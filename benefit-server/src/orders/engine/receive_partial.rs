//! Partial receive with order splitting

use chrono::NaiveDate;
use shared::order::{ReceiveOutcome, ReceivedLine};

use crate::orders::error::OrderResult;

use super::split::ReceiveMode;
use super::OrderEngine;

impl OrderEngine {
    /// Receive some of an order's items; the unreceived remainder is split
    /// into a new order so the received portion can start collecting.
    pub fn receive_partial(
        &self,
        order_id: &str,
        received: Vec<ReceivedLine>,
        actor: &str,
        today: NaiveDate,
    ) -> OrderResult<ReceiveOutcome> {
        self.execute_receive(order_id, received, actor, today, ReceiveMode::Deduction)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::orders::error::OrderError;
    use shared::order::{ItemStatus, OrderStatus, ReceivedLine};

    fn recv(line_id: &str, quantity: i32) -> ReceivedLine {
        ReceivedLine {
            line_id: line_id.to_string(),
            received_quantity: quantity,
        }
    }

    #[test]
    fn full_receive_creates_no_remainder() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(vec![item("Work Shirt", Some("M"), 2)], 2),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        let lines = engine.store().lines_for_order(&order.order_id).unwrap();

        let outcome = engine
            .receive_partial(
                &order.order_id,
                vec![recv(&lines[0].line_id, 2)],
                "mgr-1",
                d(2026, 3, 4),
            )
            .unwrap();
        assert!(outcome.remainder_order_id.is_none());
        assert_eq!(outcome.order.status, OrderStatus::Active);
        assert_eq!(outcome.order.total_amount, 40.0);
    }

    #[test]
    fn zero_receive_is_rejected() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(vec![item("Work Shirt", Some("M"), 2)], 1),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        let err = engine
            .receive_partial(&order.order_id, vec![], "mgr-1", d(2026, 3, 4))
            .unwrap_err();
        assert!(matches!(err, OrderError::NothingReceived(_)));
    }

    #[test]
    fn subset_splits_exactly_one_remainder_order() {
        let (engine, notifier) = engine();
        let order = engine
            .create_order(
                request(
                    vec![item("Work Shirt", Some("M"), 1), item("Work Pants", Some("L"), 1)],
                    2,
                ),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        let lines = engine.store().lines_for_order(&order.order_id).unwrap();
        let shirt = lines.iter().find(|l| l.item_name == "Work Shirt").unwrap();

        let outcome = engine
            .receive_partial(
                &order.order_id,
                vec![recv(&shirt.line_id, 1)],
                "mgr-1",
                d(2026, 3, 4),
            )
            .unwrap();

        // Retained: the 20.00 shirt, now collecting over 2 paychecks
        assert_eq!(outcome.order.total_amount, 20.0);
        assert_eq!(outcome.order.amount_per_installment, 10.0);
        assert_eq!(outcome.order.status, OrderStatus::Active);

        // Remainder: the 15.00 pants, pending again under the same plan
        let remainder_id = outcome.remainder_order_id.unwrap();
        let remainder = engine.store().get_order(&remainder_id).unwrap().unwrap();
        assert_eq!(remainder.total_amount, 15.0);
        assert_eq!(remainder.payment_plan, 2);
        assert_eq!(remainder.status, OrderStatus::Pending);
        assert_eq!(remainder.parent_order_id.as_deref(), Some(order.order_id.as_str()));
        assert_eq!(remainder.employee_id, order.employee_id);

        // Conservation: totals still add up to the original
        assert_eq!(outcome.order.total_amount + remainder.total_amount, 35.0);

        let moved = engine.store().lines_for_order(&remainder_id).unwrap();
        assert_eq!(moved.len(), 1);
        assert_eq!(moved[0].item_name, "Work Pants");
        assert!(engine.store().lines_for_order(&order.order_id).unwrap().len() == 1);

        let events = notifier.events.lock();
        assert!(events.iter().any(|e| matches!(
            e,
            crate::services::Notify::OrderSplit { remainder_order_id, .. }
                if *remainder_order_id == remainder_id
        )));
    }

    #[test]
    fn partial_line_splits_quantity_with_lineage() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(vec![item("Work Shirt", Some("M"), 3)], 1),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        let line = engine.store().lines_for_order(&order.order_id).unwrap()[0].clone();

        // Receive 1 of 3
        let outcome = engine
            .receive_partial(
                &order.order_id,
                vec![recv(&line.line_id, 1)],
                "mgr-1",
                d(2026, 3, 4),
            )
            .unwrap();

        let kept = engine.store().get_line(&line.line_id).unwrap().unwrap();
        assert_eq!(kept.quantity, 1);
        assert_eq!(kept.line_total, 20.0);
        assert_eq!(kept.received_quantity, 1);
        assert_eq!(kept.item_status, ItemStatus::Received);

        let remainder_id = outcome.remainder_order_id.unwrap();
        let rest = engine.store().lines_for_order(&remainder_id).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].quantity, 2);
        assert_eq!(rest[0].line_total, 40.0);
        assert_eq!(rest[0].parent_line_id.as_deref(), Some(line.line_id.as_str()));
        assert!(!rest[0].received_flag);

        assert_eq!(outcome.order.total_amount, 20.0);
        let remainder = engine.store().get_order(&remainder_id).unwrap().unwrap();
        assert_eq!(remainder.total_amount, 40.0);
    }

    #[test]
    fn over_receiving_and_foreign_lines_are_rejected() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(vec![item("Work Shirt", Some("M"), 2)], 1),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        let line = engine.store().lines_for_order(&order.order_id).unwrap()[0].clone();

        let err = engine
            .receive_partial(
                &order.order_id,
                vec![recv(&line.line_id, 3)],
                "mgr-1",
                d(2026, 3, 4),
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));

        let err = engine
            .receive_partial(
                &order.order_id,
                vec![recv("LINE-999999", 1)],
                "mgr-1",
                d(2026, 3, 4),
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::LineNotFound(_)));
    }
}
