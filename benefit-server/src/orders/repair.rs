//! Deduction-date repair
//!
//! A writer that dies between the order update and its line updates can
//! leave `first_deduction_date` inconsistent with the rest of the row.
//! This utility recomputes the date from the recorded receive date for
//! every collecting order and clears it where no deduction applies.

use serde::Serialize;
use tracing::warn;

use super::error::OrderResult;
use super::payday::PaydayCalendar;
use super::storage::OrderStore;
use shared::order::OrderStatus;

#[derive(Debug, Default, Serialize)]
pub struct RepairReport {
    /// Orders whose first deduction date was recomputed from the receive date
    pub recomputed: Vec<String>,
    /// Cash or zero-cost orders that wrongly carried a deduction date
    pub cleared: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.recomputed.is_empty() && self.cleared.is_empty()
    }
}

/// Fix `first_deduction_date` across all committed orders
pub fn repair_deduction_dates(
    store: &OrderStore,
    calendar: &PaydayCalendar,
) -> OrderResult<RepairReport> {
    let mut report = RepairReport::default();
    let txn = store.begin_write()?;

    for mut order in store.all_orders()? {
        let deducting = order.payment_plan > 0
            && matches!(order.status, OrderStatus::Active | OrderStatus::Completed)
            && order.received_date.is_some();

        if deducting {
            let received = match order.received_date {
                Some(d) => d,
                None => continue,
            };
            let expected = calendar.payday_for(received);
            if order.first_deduction_date != Some(expected) {
                warn!(
                    order_id = %order.order_id,
                    current = ?order.first_deduction_date,
                    expected = %expected,
                    "repairing first deduction date"
                );
                order.first_deduction_date = Some(expected);
                store.put_order(&txn, &order)?;
                report.recomputed.push(order.order_id.clone());
            }
        } else if order.first_deduction_date.is_some() {
            warn!(order_id = %order.order_id, "clearing stray deduction date");
            order.first_deduction_date = None;
            store.put_order(&txn, &order)?;
            report.cleared.push(order.order_id.clone());
        }
    }

    txn.commit().map_err(super::storage::StorageError::from)?;
    Ok(report)
}
