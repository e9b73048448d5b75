//! Order intake
//!
//! Prices always come from the catalog; the client only names items.
//! Replacement items are priced at zero regardless of catalog price.

use rust_decimal::Decimal;
use shared::order::{CreateOrderRequest, ItemStatus, LineItem, Order, OrderStatus};
use tracing::info;

use crate::orders::error::{OrderError, OrderResult};
use crate::orders::money;
use crate::services::Notify;

use super::OrderEngine;

/// Most line items a single order may carry
const MAX_LINE_ITEMS: usize = 5;

impl OrderEngine {
    pub fn create_order(
        &self,
        request: CreateOrderRequest,
        actor: &str,
        today: chrono::NaiveDate,
    ) -> OrderResult<Order> {
        if request.employee_id.trim().is_empty() {
            return Err(OrderError::Validation("employee is required".to_string()));
        }
        let employee = self
            .directory
            .lookup(&request.employee_id)
            .ok_or_else(|| OrderError::UnknownEmployee(request.employee_id.clone()))?;
        if !employee.active {
            return Err(OrderError::Validation(format!(
                "employee {} is inactive",
                employee.employee_id
            )));
        }
        let location = match request.location {
            Some(ref loc) if !loc.trim().is_empty() => loc.clone(),
            _ => employee.location.clone(),
        };
        if location.trim().is_empty() {
            return Err(OrderError::Validation("location is required".to_string()));
        }
        if request.items.is_empty() {
            return Err(OrderError::Validation(
                "at least one line item is required".to_string(),
            ));
        }
        if request.items.len() > MAX_LINE_ITEMS {
            return Err(OrderError::Validation(format!(
                "at most {MAX_LINE_ITEMS} line items per order"
            )));
        }
        if request.payment_plan > 3 {
            return Err(OrderError::Validation(
                "payment plan must be 0 (cash) or 1-3 installments".to_string(),
            ));
        }

        // Price every line from the catalog before touching storage
        let mut priced = Vec::with_capacity(request.items.len());
        let mut total = Decimal::ZERO;
        for input in &request.items {
            if input.quantity <= 0 {
                return Err(OrderError::Validation(format!(
                    "quantity for '{}' must be positive",
                    input.item_name
                )));
            }
            let item = self
                .catalog
                .lookup(&input.item_name)
                .ok_or_else(|| OrderError::UnknownItem(input.item_name.clone()))?;
            if !item.accepts_size(input.size.as_deref()) {
                return Err(OrderError::Validation(format!(
                    "invalid size {:?} for '{}'",
                    input.size, item.name
                )));
            }
            let unit_price = if input.is_replacement { 0.0 } else { item.price };
            let line_total = money::line_total(unit_price, input.quantity);
            total += money::to_decimal(line_total);
            priced.push((input, item, unit_price, line_total));
        }
        let total = money::to_f64(total);

        // Ids are allocated outside the write transaction
        let order_id = self.ids.next_order_id(chrono::Datelike::year(&today))?;
        let line_ids = self.ids.next_line_ids(priced.len())?;

        let status = Self::initial_status(total, request.payment_plan);
        let order = Order {
            order_id: order_id.clone(),
            employee_id: employee.employee_id.clone(),
            employee_name: employee.name.clone(),
            location,
            order_date: today,
            total_amount: total,
            payment_plan: request.payment_plan,
            amount_per_installment: money::per_installment(total, request.payment_plan),
            first_deduction_date: None,
            installments_paid: 0,
            amount_paid: if status == OrderStatus::StorePaid { total } else { 0.0 },
            amount_remaining: if status == OrderStatus::StorePaid { 0.0 } else { total },
            status,
            notes: request.notes.clone(),
            created_by: actor.to_string(),
            created_at: shared::util::now_millis(),
            received_date: None,
            parent_order_id: None,
        };

        let txn = self.store.begin_write()?;
        self.store.put_order(&txn, &order)?;
        for (line_id, (input, item, unit_price, line_total)) in line_ids.iter().zip(&priced) {
            let line = LineItem {
                line_id: line_id.clone(),
                order_id: order_id.clone(),
                item_id: item.item_id.clone(),
                item_name: item.name.clone(),
                size: input.size.clone(),
                quantity: input.quantity,
                unit_price: *unit_price,
                line_total: *line_total,
                is_replacement: input.is_replacement,
                received_flag: false,
                received_quantity: 0,
                received_date: None,
                received_by: None,
                item_status: ItemStatus::Pending,
                parent_line_id: None,
            };
            self.store.put_line(&txn, &line, None)?;
        }
        txn.commit()
            .map_err(crate::orders::storage::StorageError::from)?;

        info!(
            order_id = %order.order_id,
            employee_id = %order.employee_id,
            total = order.total_amount,
            plan = order.payment_plan,
            status = %order.status,
            "order created"
        );
        self.notifier.notify(Notify::OrderCreated {
            order_id: order.order_id.clone(),
            employee_id: order.employee_id.clone(),
            total_amount: order.total_amount,
        });
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use crate::orders::error::OrderError;
    use shared::order::OrderStatus;

    #[test]
    fn totals_sum_priced_lines_to_cents() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(
                    vec![
                        item("Work Shirt", Some("M"), 1), // 20.00
                        item("Work Pants", Some("L"), 1), // 15.00
                    ],
                    2,
                ),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        assert_eq!(order.total_amount, 35.0);
        assert_eq!(order.amount_per_installment, 17.5);
        assert_eq!(order.amount_remaining, 35.0);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.first_deduction_date.is_none());

        let lines = engine.store().lines_for_order(&order.order_id).unwrap();
        assert_eq!(lines.len(), 2);
        let sum: f64 = lines.iter().map(|l| l.line_total).sum();
        assert_eq!(sum, order.total_amount);
    }

    #[test]
    fn replacements_are_free_and_zero_total_is_store_paid() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(vec![replacement("Work Shirt", Some("M"), 2)], 1),
                "mgr-1",
                d(2026, 3, 2),
            )
            .unwrap();
        assert_eq!(order.total_amount, 0.0);
        assert_eq!(order.status, OrderStatus::StorePaid);
        assert_eq!(order.amount_remaining, 0.0);
    }

    #[test]
    fn cash_plan_starts_pending_cash() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(vec![item("Belt", None, 1)], 0),
                "emp-1",
                d(2026, 3, 2),
            )
            .unwrap();
        assert_eq!(order.status, OrderStatus::PendingCash);
        assert_eq!(order.amount_per_installment, 0.0);
    }

    #[test]
    fn rejects_bad_input() {
        let (engine, _) = engine();
        let today = d(2026, 3, 2);

        let err = engine
            .create_order(request(vec![], 1), "mgr-1", today)
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));

        let six = (0..6).map(|_| item("Belt", None, 1)).collect();
        let err = engine
            .create_order(request(six, 1), "mgr-1", today)
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));

        let err = engine
            .create_order(request(vec![item("Belt", None, 0)], 1), "mgr-1", today)
            .unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));

        let err = engine
            .create_order(request(vec![item("Apron", None, 1)], 1), "mgr-1", today)
            .unwrap_err();
        assert!(matches!(err, OrderError::UnknownItem(_)));

        let mut bad_emp = request(vec![item("Belt", None, 1)], 1);
        bad_emp.employee_id = "nobody".to_string();
        let err = engine.create_order(bad_emp, "mgr-1", today).unwrap_err();
        assert!(matches!(err, OrderError::UnknownEmployee(_)));

        let inactive = shared::order::CreateOrderRequest {
            employee_id: "emp-gone".to_string(),
            location: None,
            items: vec![item("Belt", None, 1)],
            payment_plan: 1,
            notes: None,
        };
        let err = engine.create_order(inactive, "mgr-1", today).unwrap_err();
        assert!(matches!(err, OrderError::Validation(_)));
    }

    #[test]
    fn location_falls_back_to_directory() {
        let (engine, _) = engine();
        let order = engine
            .create_order(
                request(vec![item("Belt", None, 1)], 1),
                "emp-1",
                d(2026, 3, 2),
            )
            .unwrap();
        assert_eq!(order.location, "Northside");
    }
}
