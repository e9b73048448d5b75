//! Bounded-time undo
//!
//! Undo is a verbatim snapshot-restore: every field captured in the
//! entry's before-state is written back over the corresponding rows.
//! Rows that exist only in the after-state (orders and lines created by
//! a split) cannot be deleted, so they are cancelled instead; ids are
//! never reused either way.

use shared::order::{ActionSnapshot, OrderStatus};
use std::collections::HashSet;
use tracing::info;

use super::engine::OrderEngine;
use super::error::{OrderError, OrderResult};

impl OrderEngine {
    /// Ledger entries, newest first
    pub fn list_actions(&self) -> OrderResult<Vec<ActionSnapshot>> {
        Ok(self.store.all_actions()?)
    }

    /// Whether an entry exists and is still within its undo window
    pub fn can_undo(&self, action_id: &str) -> OrderResult<bool> {
        Ok(self
            .store
            .get_action(action_id)?
            .map(|a| a.is_undoable_at(shared::util::now_millis()))
            .unwrap_or(false))
    }

    pub fn undo_action(&self, action_id: &str, actor: &str) -> OrderResult<ActionSnapshot> {
        self.undo_action_at(action_id, actor, shared::util::now_millis())
    }

    pub(crate) fn undo_action_at(
        &self,
        action_id: &str,
        actor: &str,
        now: i64,
    ) -> OrderResult<ActionSnapshot> {
        let txn = self.store.begin_write()?;
        let mut entry = self
            .store
            .get_action_txn(&txn, action_id)?
            .ok_or_else(|| {
                OrderError::NotUndoable(action_id.to_string(), "unknown action".to_string())
            })?;

        if entry.undone {
            return Err(OrderError::NotUndoable(
                action_id.to_string(),
                "already undone".to_string(),
            ));
        }
        if now >= entry.expires_at {
            return Err(OrderError::NotUndoable(
                action_id.to_string(),
                "undo window expired".to_string(),
            ));
        }

        let mut restored_orders = HashSet::new();
        let mut restored_lines = HashSet::new();

        // Write the before-state back verbatim
        for snap in &entry.before_state {
            let mut order = self.load_order(&txn, &snap.order_id)?;
            order.status = snap.status;
            order.total_amount = snap.total_amount;
            order.payment_plan = snap.payment_plan;
            order.amount_per_installment = snap.amount_per_installment;
            order.installments_paid = snap.installments_paid;
            order.amount_paid = snap.amount_paid;
            order.amount_remaining = snap.amount_remaining;
            order.first_deduction_date = snap.first_deduction_date;
            order.received_date = snap.received_date;
            self.store.put_order(&txn, &order)?;
            restored_orders.insert(snap.order_id.clone());

            for line_snap in &snap.lines {
                let mut line = self
                    .store
                    .get_line_txn(&txn, &line_snap.line_id)?
                    .ok_or_else(|| OrderError::LineNotFound(line_snap.line_id.clone()))?;
                let previous_owner = line.order_id.clone();
                line.order_id = line_snap.order_id.clone();
                line.quantity = line_snap.quantity;
                line.unit_price = line_snap.unit_price;
                line.line_total = line_snap.line_total;
                line.received_flag = line_snap.received_flag;
                line.received_quantity = line_snap.received_quantity;
                line.received_date = line_snap.received_date;
                line.received_by = line_snap.received_by.clone();
                line.item_status = line_snap.item_status;
                self.store.put_line(&txn, &line, Some(&previous_owner))?;
                restored_lines.insert(line_snap.line_id.clone());
            }
        }

        // Rows the action created have no before-state; cancel them
        for snap in &entry.after_state {
            if !restored_orders.contains(&snap.order_id) {
                let mut order = self.load_order(&txn, &snap.order_id)?;
                order.status = OrderStatus::Cancelled;
                self.store.put_order(&txn, &order)?;
            }
            for line_snap in &snap.lines {
                if restored_lines.contains(&line_snap.line_id) {
                    continue;
                }
                if let Some(mut line) = self.store.get_line_txn(&txn, &line_snap.line_id)? {
                    line.item_status = shared::order::ItemStatus::Cancelled;
                    self.store.put_line(&txn, &line, None)?;
                }
            }
        }

        entry.undone = true;
        entry.undone_at = Some(now);
        entry.undone_by = Some(actor.to_string());
        self.store.put_action(&txn, &entry)?;
        txn.commit().map_err(super::storage::StorageError::from)?;

        info!(action_id = %entry.action_id, action_type = %entry.action_type, "action undone");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::super::engine::testing::*;
    use super::super::engine::UndoPolicy;
    use crate::orders::error::OrderError;
    use shared::order::{ItemStatus, OrderStatus, ReceivedLine};

    fn recv(line_id: &str, quantity: i32) -> ReceivedLine {
        ReceivedLine {
            line_id: line_id.to_string(),
            received_quantity: quantity,
        }
    }

    #[test]
    fn undo_restores_every_snapshotted_field() {
        let (engine, _) = engine();
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
        let received = engine
            .mark_received(&order.order_id, "mgr-1", d(2026, 3, 4))
            .unwrap();
        assert_eq!(received.status, OrderStatus::Active);

        let action = &engine.list_actions().unwrap()[0];
        engine.undo_action(&action.action_id, "mgr-2").unwrap();

        let restored = engine.store().get_order(&order.order_id).unwrap().unwrap();
        assert_eq!(restored.status, OrderStatus::Pending);
        assert!(restored.first_deduction_date.is_none());
        assert!(restored.received_date.is_none());
        assert_eq!(restored.amount_remaining, 35.0);
        for line in engine.store().lines_for_order(&order.order_id).unwrap() {
            assert!(!line.received_flag);
            assert_eq!(line.received_quantity, 0);
            assert_eq!(line.item_status, ItemStatus::Pending);
            assert!(line.received_by.is_none());
        }
    }

    #[test]
    fn undo_of_a_split_reunites_the_order_and_cancels_the_remainder() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(vec![item("Work Shirt", Some("M"), 3)], 1),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        let line = engine.store().lines_for_order(&order.order_id).unwrap()[0].clone();
        let outcome = engine
            .receive_partial(&order.order_id, vec![recv(&line.line_id, 1)], "mgr-1", d(2026, 3, 4))
            .unwrap();
        let remainder_id = outcome.remainder_order_id.unwrap();

        let action = &engine.list_actions().unwrap()[0];
        engine.undo_action(&action.action_id, "mgr-1").unwrap();

        // Original back to its pre-split shape
        let restored = engine.store().get_order(&order.order_id).unwrap().unwrap();
        assert_eq!(restored.status, OrderStatus::Pending);
        assert_eq!(restored.total_amount, 60.0);
        let restored_line = engine.store().get_line(&line.line_id).unwrap().unwrap();
        assert_eq!(restored_line.quantity, 3);
        assert_eq!(restored_line.line_total, 60.0);
        assert_eq!(restored_line.order_id, order.order_id);

        // Split-created rows cannot be deleted; they are cancelled
        let remainder = engine.store().get_order(&remainder_id).unwrap().unwrap();
        assert_eq!(remainder.status, OrderStatus::Cancelled);
        for line in engine.store().lines_for_order(&remainder_id).unwrap() {
            assert_eq!(line.item_status, ItemStatus::Cancelled);
        }
    }

    #[test]
    fn second_undo_of_the_same_action_fails() {
        let (engine, _) = engine();
        let order = engine
            .create_order(request(vec![item("Belt", None, 1)], 1), "mgr-1", d(2026, 3, 2))
            .unwrap();
        engine
            .mark_received(&order.order_id, "mgr-1", d(2026, 3, 4))
            .unwrap();
        let action_id = engine.list_actions().unwrap()[0].action_id.clone();

        engine.undo_action(&action_id, "mgr-1").unwrap();
        let err = engine.undo_action(&action_id, "mgr-1").unwrap_err();
        assert!(matches!(err, OrderError::NotUndoable(_, _)));
    }

    #[test]
    fn undo_refused_past_the_window() {
        let (engine, _) = engine();
        let order = engine
            .create_order(request(vec![item("Belt", None, 1)], 1), "mgr-1", d(2026, 3, 2))
            .unwrap();
        engine
            .mark_received(&order.order_id, "mgr-1", d(2026, 3, 4))
            .unwrap();
        let action = engine.list_actions().unwrap()[0].clone();

        assert!(engine.can_undo(&action.action_id).unwrap());
        let err = engine
            .undo_action_at(&action.action_id, "mgr-1", action.expires_at)
            .unwrap_err();
        assert!(matches!(err, OrderError::NotUndoable(_, _)));
    }

    #[test]
    fn ledger_keeps_only_the_newest_entries() {
        let (engine, _) = engine_with_policy(UndoPolicy {
            window_ms: 12 * 60 * 60 * 1000,
            retain: 3,
        });
        for _ in 0..5 {
            let order = engine
                .create_order(request(vec![item("Belt", None, 1)], 1), "mgr-1", d(2026, 3, 2))
                .unwrap();
            engine
                .mark_received(&order.order_id, "mgr-1", d(2026, 3, 4))
                .unwrap();
        }
        assert_eq!(engine.list_actions().unwrap().len(), 3);
    }

    #[test]
    fn unknown_action_is_not_undoable() {
        let (engine, _) = engine();
        let err = engine.undo_action("no-such-id", "mgr-1").unwrap_err();
        assert!(matches!(err, OrderError::NotUndoable(_, _)));
        assert!(!engine.can_undo("no-such-id").unwrap());
    }
}
