//! Benefit Server - uniform benefit order lifecycle and payroll deduction
//! scheduler
//!
//! # Module structure
//!
//! ```text
//! benefit-server/src/
//! ├── core/          # configuration, state, HTTP server
//! ├── common/        # error envelope, logging
//! ├── services/      # catalog, employee directory, notifications
//! ├── api/           # HTTP routes and handlers
//! └── orders/        # lifecycle engine, storage, payday math, undo, audit
//! ```

pub mod api;
pub mod common;
pub mod core;
pub mod orders;
pub mod services;

pub use common::{AppError, AppResponse};
pub use core::{AppState, Config, Server};
pub use orders::{
    ConflictDetector, IdGenerator, OrderEngine, OrderError, OrderStore, PaydayCalendar,
    ScheduleReader, UndoPolicy,
};

/// Load .env and initialize logging from the environment
pub fn setup_environment(config: &Config) -> anyhow::Result<()> {
    let level = if config.is_production() { "info" } else { "debug" };
    common::logger::init_logger(level, config.is_production(), Some(&config.log_dir()))
}
