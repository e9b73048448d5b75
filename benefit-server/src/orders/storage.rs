//! redb-based storage layer for orders, line items, counters and the undo ledger
//!
//! # Tables
//!
//! | Table | Key | Value | Purpose |
//! |-------|-----|-------|---------|
//! | `orders` | `order_id` | `Order` | Order rows |
//! | `line_items` | `line_id` | `LineItem` | Line-item rows |
//! | `lines_by_order` | `(order_id, line_id)` | `()` | Owning-order index |
//! | `counters` | `counter_name` | `u64` | Named id counters |
//! | `action_log` | `action_id` | `ActionSnapshot` | Undo ledger entries |
//!
//! # Durability
//!
//! redb commits with `Durability::Immediate`: once `commit()` returns the
//! state is on disk, using copy-on-write with an atomic root swap. Every
//! lifecycle operation runs inside a single write transaction, so the
//! multi-row updates the lifecycle performs are atomic; there is no
//! partial-write window between the order row and its line rows.

use redb::{
    Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction,
};
use shared::order::{ActionSnapshot, LineItem, Order};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Table for order rows: key = order_id, value = JSON-serialized Order
const ORDERS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table for line-item rows: key = line_id, value = JSON-serialized LineItem
const LINES_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("line_items");

/// Index of lines per order: key = (order_id, line_id), value = empty
const LINES_BY_ORDER_TABLE: TableDefinition<(&str, &str), ()> =
    TableDefinition::new("lines_by_order");

/// Table for named id counters: key = counter name, value = current value
const COUNTERS_TABLE: TableDefinition<&str, u64> = TableDefinition::new("counters");

/// Table for undo ledger entries: key = action_id, value = JSON-serialized ActionSnapshot
const ACTION_LOG_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("action_log");

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Line item not found: {0}")]
    LineNotFound(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Order store backed by redb
#[derive(Clone)]
pub struct OrderStore {
    db: Arc<Database>,
}

impl OrderStore {
    /// Open or create the database at the given path
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let db = Database::create(path)?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StorageResult<Self> {
        let db = Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?;
        let store = Self { db: Arc::new(db) };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> StorageResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let _ = write_txn.open_table(ORDERS_TABLE)?;
            let _ = write_txn.open_table(LINES_TABLE)?;
            let _ = write_txn.open_table(LINES_BY_ORDER_TABLE)?;
            let _ = write_txn.open_table(COUNTERS_TABLE)?;
            let _ = write_txn.open_table(ACTION_LOG_TABLE)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Begin a write transaction
    ///
    /// redb allows a single write transaction at a time; callers must not
    /// hold one while requesting another (ids are generated beforehand for
    /// exactly this reason).
    pub fn begin_write(&self) -> StorageResult<WriteTransaction> {
        Ok(self.db.begin_write()?)
    }

    // ========== Order Operations ==========

    /// Insert or overwrite an order row
    pub fn put_order(&self, txn: &WriteTransaction, order: &Order) -> StorageResult<()> {
        let mut table = txn.open_table(ORDERS_TABLE)?;
        let value = serde_json::to_vec(order)?;
        table.insert(order.order_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get an order row (read-only)
    pub fn get_order(&self, order_id: &str) -> StorageResult<Option<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get an order row within a write transaction
    pub fn get_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Option<Order>> {
        let table = txn.open_table(ORDERS_TABLE)?;
        match table.get(order_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All order rows (committed view)
    pub fn all_orders(&self) -> StorageResult<Vec<Order>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ORDERS_TABLE)?;
        let mut orders = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            orders.push(serde_json::from_slice(value.value())?);
        }
        Ok(orders)
    }

    // ========== Line Item Operations ==========

    /// Insert or overwrite a line row, maintaining the owning-order index.
    ///
    /// `previous_order_id` must be passed when a split reassigns the line
    /// to a different order, so the stale index entry is removed.
    pub fn put_line(
        &self,
        txn: &WriteTransaction,
        line: &LineItem,
        previous_order_id: Option<&str>,
    ) -> StorageResult<()> {
        {
            let mut table = txn.open_table(LINES_TABLE)?;
            let value = serde_json::to_vec(line)?;
            table.insert(line.line_id.as_str(), value.as_slice())?;
        }
        let mut index = txn.open_table(LINES_BY_ORDER_TABLE)?;
        if let Some(prev) = previous_order_id
            && prev != line.order_id
        {
            index.remove(&(prev, line.line_id.as_str()))?;
        }
        index.insert((line.order_id.as_str(), line.line_id.as_str()), ())?;
        Ok(())
    }

    /// Get a line row (read-only)
    pub fn get_line(&self, line_id: &str) -> StorageResult<Option<LineItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LINES_TABLE)?;
        match table.get(line_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get a line row within a write transaction
    pub fn get_line_txn(
        &self,
        txn: &WriteTransaction,
        line_id: &str,
    ) -> StorageResult<Option<LineItem>> {
        let table = txn.open_table(LINES_TABLE)?;
        match table.get(line_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All lines belonging to an order (committed view)
    pub fn lines_for_order(&self, order_id: &str) -> StorageResult<Vec<LineItem>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(LINES_BY_ORDER_TABLE)?;
        let lines_table = read_txn.open_table(LINES_TABLE)?;

        let mut lines = Vec::new();
        for result in index.range((order_id, "")..)? {
            let (key, _value) = result?;
            let (owner, line_id) = key.value();
            if owner != order_id {
                break;
            }
            if let Some(guard) = lines_table.get(line_id)? {
                lines.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(lines)
    }

    /// All lines belonging to an order, within a write transaction
    pub fn lines_for_order_txn(
        &self,
        txn: &WriteTransaction,
        order_id: &str,
    ) -> StorageResult<Vec<LineItem>> {
        let index = txn.open_table(LINES_BY_ORDER_TABLE)?;
        let lines_table = txn.open_table(LINES_TABLE)?;

        let mut lines = Vec::new();
        for result in index.range((order_id, "")..)? {
            let (key, _value) = result?;
            let (owner, line_id) = key.value();
            if owner != order_id {
                break;
            }
            if let Some(guard) = lines_table.get(line_id)? {
                lines.push(serde_json::from_slice(guard.value())?);
            }
        }
        Ok(lines)
    }

    /// All line rows (committed view; used by the conflict scan and id seeding)
    pub fn all_lines(&self) -> StorageResult<Vec<LineItem>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LINES_TABLE)?;
        let mut lines = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            lines.push(serde_json::from_slice(value.value())?);
        }
        Ok(lines)
    }

    // ========== Counter Operations ==========

    /// Read a named counter within a write transaction (0 when unset)
    pub fn get_counter(&self, txn: &WriteTransaction, name: &str) -> StorageResult<u64> {
        let table = txn.open_table(COUNTERS_TABLE)?;
        Ok(table.get(name)?.map(|guard| guard.value()).unwrap_or(0))
    }

    /// Write a named counter within a write transaction
    pub fn set_counter(&self, txn: &WriteTransaction, name: &str, value: u64) -> StorageResult<()> {
        let mut table = txn.open_table(COUNTERS_TABLE)?;
        table.insert(name, value)?;
        Ok(())
    }

    /// Read a named counter (committed view)
    pub fn read_counter(&self, name: &str) -> StorageResult<u64> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(COUNTERS_TABLE)?;
        Ok(table.get(name)?.map(|guard| guard.value()).unwrap_or(0))
    }

    // ========== Undo Ledger Operations ==========

    /// Insert or overwrite a ledger entry
    pub fn put_action(&self, txn: &WriteTransaction, action: &ActionSnapshot) -> StorageResult<()> {
        let mut table = txn.open_table(ACTION_LOG_TABLE)?;
        let value = serde_json::to_vec(action)?;
        table.insert(action.action_id.as_str(), value.as_slice())?;
        Ok(())
    }

    /// Get a ledger entry (read-only)
    pub fn get_action(&self, action_id: &str) -> StorageResult<Option<ActionSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTION_LOG_TABLE)?;
        match table.get(action_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// Get a ledger entry within a write transaction
    pub fn get_action_txn(
        &self,
        txn: &WriteTransaction,
        action_id: &str,
    ) -> StorageResult<Option<ActionSnapshot>> {
        let table = txn.open_table(ACTION_LOG_TABLE)?;
        match table.get(action_id)? {
            Some(guard) => Ok(Some(serde_json::from_slice(guard.value())?)),
            None => Ok(None),
        }
    }

    /// All ledger entries, newest first (committed view)
    pub fn all_actions(&self) -> StorageResult<Vec<ActionSnapshot>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(ACTION_LOG_TABLE)?;
        let mut actions: Vec<ActionSnapshot> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            actions.push(serde_json::from_slice(value.value())?);
        }
        actions.sort_by_key(|a| std::cmp::Reverse(a.timestamp));
        Ok(actions)
    }

    /// All ledger entries within a write transaction, newest first
    pub fn all_actions_txn(&self, txn: &WriteTransaction) -> StorageResult<Vec<ActionSnapshot>> {
        let table = txn.open_table(ACTION_LOG_TABLE)?;
        let mut actions: Vec<ActionSnapshot> = Vec::new();
        for result in table.iter()? {
            let (_key, value) = result?;
            actions.push(serde_json::from_slice(value.value())?);
        }
        actions.sort_by_key(|a| std::cmp::Reverse(a.timestamp));
        Ok(actions)
    }

    /// Remove a ledger entry
    pub fn delete_action(&self, txn: &WriteTransaction, action_id: &str) -> StorageResult<()> {
        let mut table = txn.open_table(ACTION_LOG_TABLE)?;
        table.remove(action_id)?;
        Ok(())
    }
}
