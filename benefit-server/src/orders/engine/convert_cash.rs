//! Cash conversion
//!
//! The employee pays for the received portion at the register instead of
//! through payroll. Split behavior is identical to a partial receive; the
//! retained portion settles immediately with no deduction schedule.

use chrono::NaiveDate;
use shared::order::{ReceiveOutcome, ReceivedLine};

use crate::orders::error::OrderResult;

use super::split::ReceiveMode;
use super::OrderEngine;

impl OrderEngine {
    pub fn convert_to_cash(
        &self,
        order_id: &str,
        received: Vec<ReceivedLine>,
        actor: &str,
        today: NaiveDate,
    ) -> OrderResult<ReceiveOutcome> {
        self.execute_receive(order_id, received, actor, today, ReceiveMode::Cash)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::orders::error::OrderError;
    use shared::order::{OrderStatus, ReceivedLine};

    fn recv(line_id: &str, quantity: i32) -> ReceivedLine {
        ReceivedLine {
            line_id: line_id.to_string(),
            received_quantity: quantity,
        }
    }

    #[test]
    fn retained_portion_settles_immediately() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(vec![item("Work Shirt", Some("M"), 1)], 2),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        let line = engine.store().lines_for_order(&order.order_id).unwrap()[0].clone();

        let outcome = engine
            .convert_to_cash(
                &order.order_id,
                vec![recv(&line.line_id, 1)],
                "mgr-1",
                d(2026, 3, 4),
            )
            .unwrap();
        let settled = outcome.order;
        assert_eq!(settled.status, OrderStatus::Completed);
        assert_eq!(settled.payment_plan, 0);
        assert_eq!(settled.amount_paid, 20.0);
        assert_eq!(settled.amount_remaining, 0.0);
        assert!(settled.first_deduction_date.is_none());
        assert!(outcome.remainder_order_id.is_none());
    }

    #[test]
    fn remainder_keeps_the_original_deduction_plan() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(
                    vec![item("Work Shirt", Some("M"), 1), item("Work Pants", Some("L"), 1)],
                    3,
                ),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        let lines = engine.store().lines_for_order(&order.order_id).unwrap();
        let shirt = lines.iter().find(|l| l.item_name == "Work Shirt").unwrap();

        let outcome = engine
            .convert_to_cash(
                &order.order_id,
                vec![recv(&shirt.line_id, 1)],
                "mgr-1",
                d(2026, 3, 4),
            )
            .unwrap();
        assert_eq!(outcome.order.status, OrderStatus::Completed);
        assert_eq!(outcome.order.payment_plan, 0);

        let remainder_id = outcome.remainder_order_id.unwrap();
        let remainder = engine.store().get_order(&remainder_id).unwrap().unwrap();
        assert_eq!(remainder.payment_plan, 3);
        assert_eq!(remainder.status, OrderStatus::Pending);
        assert_eq!(remainder.total_amount, 15.0);
    }

    #[test]
    fn legal_from_pending_cash_but_not_active() {
        let (engine, _) = engine();
        let order = engine
            .create_order(request(vec![item("Belt", None, 1)], 0), "mgr-1", d(2026, 3, 2))
            .unwrap();
        assert_eq!(order.status, OrderStatus::PendingCash);
        let line = engine.store().lines_for_order(&order.order_id).unwrap()[0].clone();
        let outcome = engine
            .convert_to_cash(
                &order.order_id,
                vec![recv(&line.line_id, 1)],
                "emp-1",
                d(2026, 3, 4),
            )
            .unwrap();
        assert_eq!(outcome.order.status, OrderStatus::Completed);

        let active = engine
            .create_order(request(vec![item("Belt", None, 1)], 1), "mgr-1", d(2026, 3, 2))
            .unwrap();
        engine
            .mark_received(&active.order_id, "mgr-1", d(2026, 3, 4))
            .unwrap();
        let line = engine.store().lines_for_order(&active.order_id).unwrap()[0].clone();
        let err = engine
            .convert_to_cash(
                &active.order_id,
                vec![recv(&line.line_id, 1)],
                "mgr-1",
                d(2026, 3, 5),
            )
            .unwrap_err();
        assert!(matches!(err, OrderError::InvalidState { .. }));
    }
}
