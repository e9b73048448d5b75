//! Deduction schedule reader
//!
//! Answers "what does payroll collect on payday X" by replaying committed
//! order state. Installment k of an order falls on
//! `first_deduction_date + 14 * (k - 1)` days; cancelled orders never
//! contribute, completed ones still show in historical paydays.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::order::{DueOrder, DuePayrollReport, OrderStatus};
use std::collections::HashSet;

use super::error::OrderResult;
use super::money;
use super::payday::PaydayCalendar;
use super::storage::OrderStore;

pub struct ScheduleReader {
    store: OrderStore,
    calendar: PaydayCalendar,
}

impl ScheduleReader {
    pub fn new(store: OrderStore, calendar: PaydayCalendar) -> Self {
        Self { store, calendar }
    }

    /// Everything due on one payday
    pub fn due_on(&self, payday: NaiveDate) -> OrderResult<DuePayrollReport> {
        let mut due = Vec::new();
        let mut total = Decimal::ZERO;
        let mut employees = HashSet::new();

        for order in self.store.all_orders()? {
            if !matches!(order.status, OrderStatus::Active | OrderStatus::Completed) {
                continue;
            }
            if order.payment_plan == 0 {
                continue;
            }
            let Some(first) = order.first_deduction_date else {
                continue;
            };
            let offset = (payday - first).num_days();
            if offset < 0 || offset % 14 != 0 {
                continue;
            }
            // Compare in i64 before narrowing: a payday far past the last
            // installment must never wrap back into the schedule
            if offset / 14 >= i64::from(order.payment_plan) {
                continue;
            }
            let installment = (offset / 14) as u8 + 1;
            let is_final = installment == order.payment_plan;
            let amount = if is_final {
                money::final_installment(
                    order.total_amount,
                    order.amount_per_installment,
                    order.payment_plan,
                )
            } else {
                order.amount_per_installment
            };
            total += money::to_decimal(amount);
            employees.insert(order.employee_id.clone());
            due.push(DueOrder {
                order_id: order.order_id,
                employee_id: order.employee_id,
                employee_name: order.employee_name,
                amount,
                is_final_installment: is_final,
            });
        }

        due.sort_by(|a, b| a.employee_name.cmp(&b.employee_name).then(a.order_id.cmp(&b.order_id)));
        Ok(DuePayrollReport {
            payday,
            orders: due,
            total_amount: money::to_f64(total),
            employee_count: employees.len(),
        })
    }

    /// Paydays for calendar views: some history, some future
    pub fn paydays(&self, today: NaiveDate, history: usize, count: usize) -> Vec<NaiveDate> {
        self.calendar.window(today, history, count)
    }
}
