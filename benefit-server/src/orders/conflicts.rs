//! Conflict audit
//!
//! Read-only batch scan over committed state. Findings are advisory and
//! require human action; the scan never mutates anything.

use serde::Serialize;
use shared::order::{Order, OrderStatus};
use std::collections::{HashMap, HashSet};

use super::error::OrderResult;
use super::money;
use super::storage::OrderStore;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictClass {
    /// Multiple non-terminal orders for one employee on the same day
    Duplicate,
    /// Status and balance disagree (completed with debt, active with none)
    Zombie,
    /// Collected more than the order total
    Overcharge,
    /// Line item whose order does not exist
    Orphan,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConflictFinding {
    pub class: ConflictClass,
    pub description: String,
    pub order_ids: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line_ids: Vec<String>,
}

pub struct ConflictDetector {
    store: OrderStore,
}

impl ConflictDetector {
    pub fn new(store: OrderStore) -> Self {
        Self { store }
    }

    pub fn scan(&self) -> OrderResult<Vec<ConflictFinding>> {
        let orders = self.store.all_orders()?;
        let lines = self.store.all_lines()?;
        let mut findings = Vec::new();

        self.find_duplicates(&orders, &mut findings);
        self.find_zombies(&orders, &mut findings);
        self.find_overcharges(&orders, &mut findings);
        self.find_orphans(&orders, &lines, &mut findings);

        Ok(findings)
    }

    fn find_duplicates(&self, orders: &[Order], findings: &mut Vec<ConflictFinding>) {
        let mut by_key: HashMap<(String, chrono::NaiveDate), Vec<&Order>> = HashMap::new();
        for order in orders.iter().filter(|o| !o.status.is_terminal()) {
            by_key
                .entry((order.employee_id.clone(), order.order_date))
                .or_default()
                .push(order);
        }
        let mut groups: Vec<_> = by_key.into_iter().filter(|(_, g)| g.len() > 1).collect();
        groups.sort_by(|a, b| a.0.cmp(&b.0));
        for ((employee_id, date), group) in groups {
            // Split remainders are expected same-day siblings, not duplicates
            let independent: Vec<&&Order> = group
                .iter()
                .filter(|o| o.parent_order_id.is_none())
                .collect();
            if independent.len() < 2 {
                continue;
            }
            findings.push(ConflictFinding {
                class: ConflictClass::Duplicate,
                description: format!(
                    "{} open orders for employee {employee_id} dated {date}",
                    independent.len()
                ),
                order_ids: independent.iter().map(|o| o.order_id.clone()).collect(),
                line_ids: Vec::new(),
            });
        }
    }

    fn find_zombies(&self, orders: &[Order], findings: &mut Vec<ConflictFinding>) {
        for order in orders {
            let remaining = money::to_decimal(order.amount_remaining);
            let zombie = match order.status {
                OrderStatus::Completed => remaining > money::MONEY_TOLERANCE,
                OrderStatus::Active => remaining <= money::MONEY_TOLERANCE,
                _ => false,
            };
            if zombie {
                findings.push(ConflictFinding {
                    class: ConflictClass::Zombie,
                    description: format!(
                        "order {} is {} with {:.2} remaining",
                        order.order_id, order.status, order.amount_remaining
                    ),
                    order_ids: vec![order.order_id.clone()],
                    line_ids: Vec::new(),
                });
            }
        }
    }

    fn find_overcharges(&self, orders: &[Order], findings: &mut Vec<ConflictFinding>) {
        for order in orders {
            let over = money::to_decimal(order.amount_paid) - money::to_decimal(order.total_amount);
            if over > money::MONEY_TOLERANCE {
                findings.push(ConflictFinding {
                    class: ConflictClass::Overcharge,
                    description: format!(
                        "order {} collected {:.2} against a total of {:.2}",
                        order.order_id, order.amount_paid, order.total_amount
                    ),
                    order_ids: vec![order.order_id.clone()],
                    line_ids: Vec::new(),
                });
            }
        }
    }

    fn find_orphans(
        &self,
        orders: &[Order],
        lines: &[shared::order::LineItem],
        findings: &mut Vec<ConflictFinding>,
    ) {
        let known: HashSet<&str> = orders.iter().map(|o| o.order_id.as_str()).collect();
        for line in lines {
            if !known.contains(line.order_id.as_str()) {
                findings.push(ConflictFinding {
                    class: ConflictClass::Orphan,
                    description: format!(
                        "line {} references missing order {}",
                        line.line_id, line.order_id
                    ),
                    order_ids: vec![line.order_id.clone()],
                    line_ids: vec![line.line_id.clone()],
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::engine::testing::*;
    use super::*;
    use shared::order::{ItemStatus, LineItem};

    fn detector(engine: &crate::orders::engine::OrderEngine) -> ConflictDetector {
        ConflictDetector::new(engine.store().clone())
    }

    #[test]
    fn healthy_state_scans_clean() {
        let (engine, _) = engine();
        let order = engine
            .create_order(request(vec![item("Belt", None, 1)], 2), "mgr-1", d(2026, 3, 2))
            .unwrap();
        engine
            .mark_received(&order.order_id, "mgr-1", d(2026, 3, 4))
            .unwrap();
        engine.record_installment(&order.order_id, "payroll").unwrap();

        assert!(detector(&engine).scan().unwrap().is_empty());
    }

    #[test]
    fn completed_order_with_balance_is_a_zombie() {
        let (engine, _) = engine();
        let order = engine
            .create_order(request(vec![item("Work Pants", Some("M"), 1)], 1), "mgr-1", d(2026, 3, 2))
            .unwrap();

        // Corrupt the row the way a crashed writer would
        let mut broken = engine.store().get_order(&order.order_id).unwrap().unwrap();
        broken.status = shared::order::OrderStatus::Completed;
        broken.amount_remaining = 5.0;
        let txn = engine.store().begin_write().unwrap();
        engine.store().put_order(&txn, &broken).unwrap();
        txn.commit().unwrap();

        let findings = detector(&engine).scan().unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].class, ConflictClass::Zombie);
        assert_eq!(findings[0].order_ids, vec![order.order_id]);
    }

    #[test]
    fn overcharge_beyond_epsilon_is_flagged() {
        let (engine, _) = engine();
        let order = engine
            .create_order(request(vec![item("Belt", None, 1)], 1), "mgr-1", d(2026, 3, 2))
            .unwrap();
        let mut broken = engine.store().get_order(&order.order_id).unwrap().unwrap();
        broken.amount_paid = broken.total_amount + 0.5;
        let txn = engine.store().begin_write().unwrap();
        engine.store().put_order(&txn, &broken).unwrap();
        txn.commit().unwrap();

        let findings = detector(&engine).scan().unwrap();
        assert!(findings.iter().any(|f| f.class == ConflictClass::Overcharge));
    }

    #[test]
    fn same_day_duplicates_are_flagged_but_split_remainders_are_not() {
        let (engine, _) = engine();
        let today = d(2026, 3, 2);
        engine
            .create_order(request(vec![item("Belt", None, 1)], 1), "mgr-1", today)
            .unwrap();
        engine
            .create_order(request(vec![item("Work Shirt", Some("M"), 1)], 1), "mgr-1", today)
            .unwrap();

        let findings = detector(&engine).scan().unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].class, ConflictClass::Duplicate);
        assert_eq!(findings[0].order_ids.len(), 2);

        // A split creates a same-day sibling with a parent reference;
        // receiving part of a fresh order must not add a finding
        let (engine, _) = super::super::engine::testing::engine();
        let order = engine
            .create_order(
                request(
                    vec![item("Work Shirt", Some("M"), 1), item("Work Pants", Some("L"), 1)],
                    1,
                ),
                "mgr-1",
                today,
            )
            .unwrap();
        let lines = engine.store().lines_for_order(&order.order_id).unwrap();
        engine
            .receive_partial(
                &order.order_id,
                vec![shared::order::ReceivedLine {
                    line_id: lines[0].line_id.clone(),
                    received_quantity: lines[0].quantity,
                }],
                "mgr-1",
                today,
            )
            .unwrap();
        let findings = detector(&engine).scan().unwrap();
        assert!(findings.iter().all(|f| f.class != ConflictClass::Duplicate));
    }

    #[test]
    fn orphaned_lines_are_reported() {
        let (engine, _) = engine();
        let orphan = LineItem {
            line_id: "LINE-424242".to_string(),
            order_id: "ORD-2020-0001".to_string(),
            item_id: "item-belt".to_string(),
            item_name: "Belt".to_string(),
            size: None,
            quantity: 1,
            unit_price: 8.0,
            line_total: 8.0,
            is_replacement: false,
            received_flag: false,
            received_quantity: 0,
            received_date: None,
            received_by: None,
            item_status: ItemStatus::Pending,
            parent_line_id: None,
        };
        let txn = engine.store().begin_write().unwrap();
        engine.store().put_line(&txn, &orphan, None).unwrap();
        txn.commit().unwrap();

        let findings = detector(&engine).scan().unwrap();
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].class, ConflictClass::Orphan);
        assert_eq!(findings[0].line_ids, vec!["LINE-424242"]);
    }
}
