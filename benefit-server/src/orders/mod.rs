//! Uniform benefit order core
//!
//! - [`engine`]: the lifecycle state machine (create, receive, split, cash
//!   conversion, payments, cancellation)
//! - [`storage`]: redb-backed order/line/ledger persistence
//! - [`idgen`]: collision-free order and line id allocation
//! - [`payday`]: bi-weekly payday date math
//! - [`schedule`]: payroll "what is due on payday X" reader
//! - [`undo`]: bounded-time snapshot-restore
//! - [`conflicts`]: advisory consistency audit
//! - [`repair`]: deduction-date repair utility

pub mod conflicts;
pub mod engine;
pub mod error;
pub mod idgen;
pub mod money;
pub mod payday;
pub mod repair;
pub mod schedule;
pub mod storage;
pub mod undo;

pub use conflicts::{ConflictClass, ConflictDetector, ConflictFinding};
pub use engine::{OrderEngine, UndoPolicy};
pub use error::{OrderError, OrderResult};
pub use idgen::IdGenerator;
pub use payday::PaydayCalendar;
pub use repair::{repair_deduction_dates, RepairReport};
pub use schedule::ScheduleReader;
pub use storage::OrderStore;
