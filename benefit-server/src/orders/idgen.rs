//! Collision-free id generation
//!
//! Order and line ids come from monotonic counters persisted in the
//! `counters` table. A generator-wide mutex with a bounded wait serializes
//! allocation; each allocation commits its own transaction BEFORE the
//! operation that will use the ids opens one, because redb does not allow
//! a second concurrent write transaction.
//!
//! Counters never reset. The year in an order id is cosmetic; uniqueness
//! comes from the sequence alone.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use super::error::{OrderError, OrderResult};
use super::storage::OrderStore;

const ORDER_SEQ: &str = "order_seq";
const LINE_SEQ: &str = "line_seq";

#[derive(Clone)]
pub struct IdGenerator {
    store: OrderStore,
    lock: Arc<Mutex<()>>,
    lock_timeout: Duration,
}

impl IdGenerator {
    pub fn new(store: OrderStore, lock_timeout: Duration) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
            lock_timeout,
        }
    }

    /// Allocate the next order id: `ORD-<year>-<seq:04>`
    pub fn next_order_id(&self, year: i32) -> OrderResult<String> {
        let seq = self.allocate(ORDER_SEQ, 1)?;
        Ok(format!("ORD-{year}-{seq:04}"))
    }

    /// Allocate a contiguous block of line ids: `LINE-<seq:06>`
    pub fn next_line_ids(&self, count: usize) -> OrderResult<Vec<String>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let last = self.allocate(LINE_SEQ, count as u64)?;
        let first = last - count as u64 + 1;
        Ok((first..=last).map(|seq| format!("LINE-{seq:06}")).collect())
    }

    /// Read-increment-write under the sequence lock, in its own transaction
    fn allocate(&self, counter: &str, by: u64) -> OrderResult<u64> {
        let _guard = self
            .lock
            .try_lock_for(self.lock_timeout)
            .ok_or(OrderError::LockTimeout)?;

        let txn = self.store.begin_write().map_err(OrderError::Storage)?;
        let next = self.store.get_counter(&txn, counter)? + by;
        self.store.set_counter(&txn, counter, next)?;
        txn.commit().map_err(super::storage::StorageError::from)?;
        Ok(next)
    }

    /// Raise the counters to cover ids already present in the tables.
    ///
    /// Run at startup so a database whose counters lag its rows (e.g. after
    /// a restore from backup) cannot hand out an id that already exists.
    pub fn reseed(&self) -> OrderResult<ReseedReport> {
        let _guard = self
            .lock
            .try_lock_for(self.lock_timeout)
            .ok_or(OrderError::LockTimeout)?;

        let max_order = self
            .store
            .all_orders()?
            .iter()
            .filter_map(|o| id_sequence(&o.order_id))
            .max()
            .unwrap_or(0);
        let max_line = self
            .store
            .all_lines()?
            .iter()
            .filter_map(|l| id_sequence(&l.line_id))
            .max()
            .unwrap_or(0);

        let txn = self.store.begin_write().map_err(OrderError::Storage)?;
        let order_seq = self.store.get_counter(&txn, ORDER_SEQ)?;
        let line_seq = self.store.get_counter(&txn, LINE_SEQ)?;
        let mut report = ReseedReport::default();
        if max_order > order_seq {
            self.store.set_counter(&txn, ORDER_SEQ, max_order)?;
            report.order_seq_raised_to = Some(max_order);
        }
        if max_line > line_seq {
            self.store.set_counter(&txn, LINE_SEQ, max_line)?;
            report.line_seq_raised_to = Some(max_line);
        }
        txn.commit().map_err(super::storage::StorageError::from)?;
        Ok(report)
    }
}

/// Trailing numeric sequence of an `ORD-`/`LINE-` id
fn id_sequence(id: &str) -> Option<u64> {
    id.rsplit('-').next()?.parse().ok()
}

#[derive(Debug, Default)]
pub struct ReseedReport {
    pub order_seq_raised_to: Option<u64>,
    pub line_seq_raised_to: Option<u64>,
}
