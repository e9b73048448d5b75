//! Full single-shot receive
//!
//! Marks every open line received in full. Never splits: the remainder
//! set is empty by construction.

use chrono::NaiveDate;
use shared::order::{Order, ReceivedLine};

use crate::orders::error::OrderResult;

use super::split::ReceiveMode;
use super::OrderEngine;

impl OrderEngine {
    pub fn mark_received(
        &self,
        order_id: &str,
        actor: &str,
        today: NaiveDate,
    ) -> OrderResult<Order> {
        let full: Vec<ReceivedLine> = self
            .store
            .lines_for_order(order_id)?
            .into_iter()
            .filter(|l| !l.is_cancelled())
            .map(|l| ReceivedLine {
                line_id: l.line_id,
                received_quantity: l.quantity,
            })
            .collect();
        let outcome = self.execute_receive(order_id, full, actor, today, ReceiveMode::Deduction)?;
        Ok(outcome.order)
    }
}
