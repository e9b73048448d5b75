//! Partial-receive split core
//!
//! Shared by [`receive_partial`] and [`convert_cash`]. For each open line
//! the ordered quantity is compared with the received quantity:
//! - fully received lines stay on the original order,
//! - fully unreceived lines are reassigned to a new remainder order,
//! - partially received lines are split: the original row shrinks to the
//!   received quantity and a new row for the remainder goes to the new
//!   order, with the original recorded as its parent.
//!
//! Row ids for the remainder are allocated before the write transaction
//! opens; the plan is recomputed inside the transaction and must still
//! match the allocation, otherwise the operation reports a concurrent
//! modification and the caller retries.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::order::{
    ActionType, ItemStatus, LineItem, Order, OrderStatus, ReceiveOutcome, ReceivedLine,
};
use std::collections::HashMap;
use tracing::info;

use crate::orders::error::{OrderError, OrderResult};
use crate::orders::money;
use crate::services::Notify;

use super::OrderEngine;

/// Received quantities keyed by line id. Lines absent from the map count
/// as fully unreceived.
pub struct ReceivedQuantities(HashMap<String, i32>);

impl ReceivedQuantities {
    pub fn new(received: Vec<ReceivedLine>) -> OrderResult<Self> {
        let mut map = HashMap::with_capacity(received.len());
        for entry in received {
            if entry.received_quantity < 0 {
                return Err(OrderError::Validation(format!(
                    "received quantity for {} cannot be negative",
                    entry.line_id
                )));
            }
            if map.insert(entry.line_id.clone(), entry.received_quantity).is_some() {
                return Err(OrderError::Validation(format!(
                    "line {} listed twice",
                    entry.line_id
                )));
            }
        }
        Ok(Self(map))
    }

    fn quantity_for(&self, line_id: &str) -> i32 {
        self.0.get(line_id).copied().unwrap_or(0)
    }

    /// Every listed line must belong to the order being received
    fn check_membership(&self, lines: &[LineItem]) -> OrderResult<()> {
        for line_id in self.0.keys() {
            if !lines.iter().any(|l| &l.line_id == line_id) {
                return Err(OrderError::LineNotFound(line_id.clone()));
            }
        }
        Ok(())
    }
}

/// Whether the retained portion keeps its deduction plan or settles in cash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReceiveMode {
    Deduction,
    Cash,
}

/// A remainder row split off a partially received line
struct RemainderLine {
    parent: LineItem,
    quantity: i32,
}

struct SplitPlan {
    /// Updated rows staying on the original order, all fully received
    retained: Vec<LineItem>,
    /// Rows to reassign to the remainder order, untouched otherwise
    moved: Vec<LineItem>,
    /// Partial remainders needing fresh line ids
    split_off: Vec<RemainderLine>,
    retained_total: f64,
    remainder_total: f64,
}

impl SplitPlan {
    fn needs_remainder(&self) -> bool {
        !self.moved.is_empty() || !self.split_off.is_empty()
    }

    fn build(
        lines: &[LineItem],
        quantities: &ReceivedQuantities,
        actor: &str,
        today: NaiveDate,
    ) -> OrderResult<Self> {
        quantities.check_membership(lines)?;

        let mut plan = SplitPlan {
            retained: Vec::new(),
            moved: Vec::new(),
            split_off: Vec::new(),
            retained_total: 0.0,
            remainder_total: 0.0,
        };
        let mut retained_total = Decimal::ZERO;
        let mut remainder_total = Decimal::ZERO;
        let mut anything_received = false;

        for line in lines {
            if line.is_cancelled() {
                if quantities.quantity_for(&line.line_id) > 0 {
                    return Err(OrderError::Validation(format!(
                        "line {} is cancelled",
                        line.line_id
                    )));
                }
                continue;
            }
            let received = quantities.quantity_for(&line.line_id);
            if received > line.quantity {
                return Err(OrderError::Validation(format!(
                    "received {} of {} exceeds ordered quantity for {}",
                    received, line.quantity, line.line_id
                )));
            }

            if received == 0 {
                remainder_total += money::to_decimal(line.line_total);
                plan.moved.push(line.clone());
                continue;
            }

            anything_received = true;
            let mut kept = line.clone();
            kept.received_flag = true;
            kept.received_quantity = received;
            kept.received_date = Some(today);
            kept.received_by = Some(actor.to_string());
            kept.item_status = ItemStatus::Received;

            if received < line.quantity {
                // Shrink the original to what arrived
                kept.quantity = received;
                kept.line_total = money::line_total(line.unit_price, received);
                let rest = line.quantity - received;
                remainder_total += money::to_decimal(money::line_total(line.unit_price, rest));
                plan.split_off.push(RemainderLine {
                    parent: line.clone(),
                    quantity: rest,
                });
            }
            retained_total += money::to_decimal(kept.line_total);
            plan.retained.push(kept);
        }

        if !anything_received {
            return Err(OrderError::NothingReceived(
                lines
                    .first()
                    .map(|l| l.order_id.clone())
                    .unwrap_or_default(),
            ));
        }
        plan.retained_total = money::to_f64(retained_total);
        plan.remainder_total = money::to_f64(remainder_total);
        Ok(plan)
    }
}

impl OrderEngine {
    /// Receive a subset of an order's items, splitting the remainder into
    /// a new order.
    pub(crate) fn execute_receive(
        &self,
        order_id: &str,
        received: Vec<ReceivedLine>,
        actor: &str,
        today: NaiveDate,
        mode: ReceiveMode,
    ) -> OrderResult<ReceiveOutcome> {
        let quantities = ReceivedQuantities::new(received)?;

        // First pass against committed state to size the id allocation
        let current = self
            .store
            .get_order(order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))?;
        self.check_receive_legal(&current, mode)?;
        let committed_lines = self.store.lines_for_order(order_id)?;
        let preview = SplitPlan::build(&committed_lines, &quantities, actor, today)?;

        let remainder_order_id = if preview.needs_remainder() {
            Some(self.ids.next_order_id(chrono::Datelike::year(&today))?)
        } else {
            None
        };
        let new_line_ids = self.ids.next_line_ids(preview.split_off.len())?;

        let txn = self.store.begin_write()?;
        let mut order = self.load_order(&txn, order_id)?;
        self.check_receive_legal(&order, mode)?;
        let lines = self.store.lines_for_order_txn(&txn, order_id)?;
        let plan = SplitPlan::build(&lines, &quantities, actor, today)?;
        if plan.needs_remainder() != remainder_order_id.is_some()
            || plan.split_off.len() != new_line_ids.len()
        {
            return Err(OrderError::Validation(format!(
                "order {order_id} was modified concurrently, retry"
            )));
        }

        let before = vec![self.capture(&txn, &order)?];

        for kept in &plan.retained {
            self.store.put_line(&txn, kept, None)?;
        }
        let mut remainder = None;
        if let Some(ref new_id) = remainder_order_id {
            for moved in &plan.moved {
                let mut line = moved.clone();
                line.order_id = new_id.clone();
                self.store.put_line(&txn, &line, Some(order_id))?;
            }
            for (line_id, rest) in new_line_ids.iter().zip(&plan.split_off) {
                let line = LineItem {
                    line_id: line_id.clone(),
                    order_id: new_id.clone(),
                    item_id: rest.parent.item_id.clone(),
                    item_name: rest.parent.item_name.clone(),
                    size: rest.parent.size.clone(),
                    quantity: rest.quantity,
                    unit_price: rest.parent.unit_price,
                    line_total: money::line_total(rest.parent.unit_price, rest.quantity),
                    is_replacement: rest.parent.is_replacement,
                    received_flag: false,
                    received_quantity: 0,
                    received_date: None,
                    received_by: None,
                    item_status: ItemStatus::Pending,
                    parent_line_id: Some(rest.parent.line_id.clone()),
                };
                self.store.put_line(&txn, &line, None)?;
            }

            // Remainder carries the same employee, location and plan
            let status = Self::initial_status(plan.remainder_total, order.payment_plan);
            let new_order = Order {
                order_id: new_id.clone(),
                employee_id: order.employee_id.clone(),
                employee_name: order.employee_name.clone(),
                location: order.location.clone(),
                order_date: today,
                total_amount: plan.remainder_total,
                payment_plan: order.payment_plan,
                amount_per_installment: money::per_installment(
                    plan.remainder_total,
                    order.payment_plan,
                ),
                first_deduction_date: None,
                installments_paid: 0,
                amount_paid: if status == OrderStatus::StorePaid {
                    plan.remainder_total
                } else {
                    0.0
                },
                amount_remaining: if status == OrderStatus::StorePaid {
                    0.0
                } else {
                    plan.remainder_total
                },
                status,
                notes: order.notes.clone(),
                created_by: actor.to_string(),
                created_at: shared::util::now_millis(),
                received_date: None,
                parent_order_id: Some(order.order_id.clone()),
            };
            self.store.put_order(&txn, &new_order)?;
            remainder = Some(new_order);
        }

        // Recompute the original order from only the retained total
        order.total_amount = plan.retained_total;
        match mode {
            ReceiveMode::Deduction => {
                order.amount_per_installment =
                    money::per_installment(plan.retained_total, order.payment_plan);
                order.amount_remaining = money::to_f64(
                    money::to_decimal(plan.retained_total) - money::to_decimal(order.amount_paid),
                );
                self.activate(&mut order, today);
            }
            ReceiveMode::Cash => {
                // Settled at the store: no deduction schedule, fully paid
                order.payment_plan = 0;
                order.amount_per_installment = 0.0;
                order.amount_paid = plan.retained_total;
                order.amount_remaining = 0.0;
                order.first_deduction_date = None;
                order.received_date = Some(today);
                order.status = OrderStatus::Completed;
            }
        }
        self.store.put_order(&txn, &order)?;

        let mut after = vec![self.capture(&txn, &order)?];
        let mut affected = vec![order.order_id.clone()];
        if let Some(ref new_order) = remainder {
            after.push(self.capture(&txn, new_order)?);
            affected.push(new_order.order_id.clone());
        }
        let action_type = match (mode, remainder.is_some()) {
            (ReceiveMode::Cash, _) => ActionType::CashConverted,
            (ReceiveMode::Deduction, true) => ActionType::OrderSplit,
            (ReceiveMode::Deduction, false) => ActionType::OrderReceived,
        };
        let description = match remainder {
            Some(ref r) => format!(
                "received {:.2} on {order_id}, remainder {:.2} split to {}",
                plan.retained_total, plan.remainder_total, r.order_id
            ),
            None => format!("received {order_id} in full"),
        };
        self.record_action(
            &txn,
            actor,
            action_type,
            description,
            affected,
            before,
            after,
        )?;
        txn.commit()
            .map_err(crate::orders::storage::StorageError::from)?;

        info!(
            order_id = %order.order_id,
            retained = plan.retained_total,
            remainder = plan.remainder_total,
            status = %order.status,
            "receive committed"
        );
        if order.status == OrderStatus::Active
            && let Some(first) = order.first_deduction_date
        {
            self.notifier.notify(Notify::DeductionScheduled {
                order_id: order.order_id.clone(),
                employee_id: order.employee_id.clone(),
                first_deduction_date: first,
                amount_per_installment: order.amount_per_installment,
                installments: order.payment_plan,
            });
        }
        if let Some(ref new_order) = remainder {
            self.notifier.notify(Notify::OrderSplit {
                order_id: order.order_id.clone(),
                remainder_order_id: new_order.order_id.clone(),
            });
        }

        Ok(ReceiveOutcome {
            order,
            remainder_order_id: remainder.map(|o| o.order_id),
        })
    }

    fn check_receive_legal(&self, order: &Order, mode: ReceiveMode) -> OrderResult<()> {
        let legal = match mode {
            ReceiveMode::Deduction => order.status.is_receivable(),
            ReceiveMode::Cash => matches!(
                order.status,
                OrderStatus::Pending | OrderStatus::PendingCash
            ),
        };
        if !legal {
            let operation = match mode {
                ReceiveMode::Deduction => "receive",
                ReceiveMode::Cash => "convert to cash",
            };
            return Err(OrderError::invalid_state(
                &order.order_id,
                order.status,
                operation,
            ));
        }
        Ok(())
    }
}
