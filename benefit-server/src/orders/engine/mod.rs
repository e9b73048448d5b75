//! Order lifecycle engine
//!
//! One operation per file:
//! - [`create_order`]: intake and pricing
//! - [`mark_received`]: full single-shot receive
//! - [`receive_partial`]: partial receive with order splitting
//! - [`convert_cash`]: cash conversion (split + immediate settlement)
//! - [`record_payment`]: one payroll installment
//! - [`cancel_order`]: employee withdrawal or administrative cancel
//!
//! Every mutating operation runs in a single write transaction and records
//! an undo ledger entry in that same transaction. Ids are allocated BEFORE
//! the transaction opens (redb permits one writer at a time).

mod cancel_order;
mod convert_cash;
mod create_order;
mod mark_received;
mod receive_partial;
mod record_payment;
mod split;

use chrono::NaiveDate;
use redb::WriteTransaction;
use shared::order::{ActionSnapshot, ActionType, Order, OrderStateSnapshot, OrderStatus};
use std::sync::Arc;

use crate::services::{Catalog, EmployeeDirectory, Notifier};

use super::error::{OrderError, OrderResult};
use super::idgen::IdGenerator;
use super::payday::PaydayCalendar;
use super::storage::OrderStore;

pub use split::ReceivedQuantities;

/// Undo ledger retention policy
#[derive(Debug, Clone, Copy)]
pub struct UndoPolicy {
    /// How long an entry stays undoable, in milliseconds
    pub window_ms: i64,
    /// Most recent entries kept; older ones are discarded
    pub retain: usize,
}

impl Default for UndoPolicy {
    fn default() -> Self {
        Self {
            window_ms: 12 * 60 * 60 * 1000,
            retain: 10,
        }
    }
}

pub struct OrderEngine {
    pub(crate) store: OrderStore,
    pub(crate) ids: IdGenerator,
    pub(crate) calendar: PaydayCalendar,
    pub(crate) catalog: Arc<dyn Catalog>,
    pub(crate) directory: Arc<dyn EmployeeDirectory>,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) undo: UndoPolicy,
}

impl OrderEngine {
    pub fn new(
        store: OrderStore,
        ids: IdGenerator,
        calendar: PaydayCalendar,
        catalog: Arc<dyn Catalog>,
        directory: Arc<dyn EmployeeDirectory>,
        notifier: Arc<dyn Notifier>,
        undo: UndoPolicy,
    ) -> Self {
        Self {
            store,
            ids,
            calendar,
            catalog,
            directory,
            notifier,
            undo,
        }
    }

    pub fn store(&self) -> &OrderStore {
        &self.store
    }

    pub fn calendar(&self) -> &PaydayCalendar {
        &self.calendar
    }

    /// Load an order within a write transaction, failing when absent
    pub(crate) fn load_order(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> OrderResult<Order> {
        self.store
            .get_order_txn(txn, order_id)?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    /// Snapshot an order and its lines within a write transaction
    pub(crate) fn capture(
        &self,
        txn: &WriteTransaction,
        order: &Order,
    ) -> OrderResult<OrderStateSnapshot> {
        let lines = self.store.lines_for_order_txn(txn, &order.order_id)?;
        Ok(OrderStateSnapshot::capture(order, &lines))
    }

    /// Append an undo ledger entry and enforce the retention cap.
    ///
    /// Runs in the operation's own transaction so the entry commits or
    /// rolls back together with the state it describes.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn record_action(
        &self,
        txn: &WriteTransaction,
        actor: &str,
        action_type: ActionType,
        description: String,
        affected_order_ids: Vec<String>,
        before: Vec<OrderStateSnapshot>,
        after: Vec<OrderStateSnapshot>,
    ) -> OrderResult<String> {
        let entry = ActionSnapshot::new(
            actor.to_string(),
            action_type,
            description,
            affected_order_ids,
            before,
            after,
            shared::util::now_millis(),
            self.undo.window_ms,
        );
        let action_id = entry.action_id.clone();
        self.store.put_action(txn, &entry)?;

        // Retention: newest-first list, drop everything past the cap
        let actions = self.store.all_actions_txn(txn)?;
        for stale in actions.iter().skip(self.undo.retain) {
            self.store.delete_action(txn, &stale.action_id)?;
        }
        Ok(action_id)
    }

    /// Status an order takes at intake, before anything is received
    pub(crate) fn initial_status(total: f64, payment_plan: u8) -> OrderStatus {
        if super::money::is_zero(total) {
            OrderStatus::StorePaid
        } else if payment_plan == 0 {
            OrderStatus::PendingCash
        } else {
            OrderStatus::Pending
        }
    }

    /// Status an order takes once its retained items are received.
    ///
    /// A deduction order starts collecting; anything with nothing left to
    /// collect (zero-cost or cash settled at the store) completes.
    pub(crate) fn received_status(total: f64, payment_plan: u8) -> OrderStatus {
        if payment_plan > 0 && !super::money::is_zero(total) {
            OrderStatus::Active
        } else {
            OrderStatus::Completed
        }
    }

    /// Apply the received-state transition to an order in place
    pub(crate) fn activate(&self, order: &mut Order, today: NaiveDate) {
        order.received_date = Some(today);
        let next = Self::received_status(order.total_amount, order.payment_plan);
        order.status = next;
        if next == OrderStatus::Active {
            order.first_deduction_date = Some(self.calendar.payday_for(today));
        } else {
            // Nothing to deduct; close the books
            order.first_deduction_date = None;
            order.amount_paid = order.total_amount;
            order.amount_remaining = 0.0;
        }
    }

}
