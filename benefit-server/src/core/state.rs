//! Shared application state
//!
//! [`AppState`] holds singleton references to every service the handlers
//! need. `Arc` fields make cloning cheap; axum clones the state per
//! request.

use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::core::Config;
use crate::orders::{
    repair_deduction_dates, ConflictDetector, IdGenerator, OrderEngine, OrderStore,
    PaydayCalendar, ScheduleReader, UndoPolicy,
};
use crate::services::{
    Catalog, EmployeeDirectory, JsonCatalog, JsonEmployeeDirectory, LogNotifier, Notifier,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub engine: Arc<OrderEngine>,
    pub schedule: Arc<ScheduleReader>,
    pub conflicts: Arc<ConflictDetector>,
}

impl AppState {
    /// Open storage, wire the services and run the startup checks
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)
            .with_context(|| format!("creating work dir {}", config.work_dir))?;

        let store = OrderStore::open(config.database_path())
            .with_context(|| format!("opening database {}", config.database_path()))?;

        let calendar = PaydayCalendar::new(config.payday_anchor)
            .map_err(|e| anyhow::anyhow!("invalid PAYDAY_ANCHOR: {e}"))?;

        let ids = IdGenerator::new(
            store.clone(),
            Duration::from_secs(config.id_lock_timeout_secs),
        );
        // Counters must cover any rows already present (e.g. restored backup)
        let reseed = ids.reseed()?;
        if reseed.order_seq_raised_to.is_some() || reseed.line_seq_raised_to.is_some() {
            warn!(?reseed, "id counters lagged existing rows, reseeded");
        }

        // Half-finished writes from a previous run are repaired on boot
        let repair = repair_deduction_dates(&store, &calendar)?;
        if !repair.is_clean() {
            warn!(
                recomputed = repair.recomputed.len(),
                cleared = repair.cleared.len(),
                "repaired deduction dates at startup"
            );
        }

        let catalog: Arc<dyn Catalog> = Arc::new(load_catalog(&config.catalog_file)?);
        let directory: Arc<dyn EmployeeDirectory> =
            Arc::new(load_directory(&config.employees_file)?);
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);

        let undo = UndoPolicy {
            window_ms: config.undo_window_hours * 60 * 60 * 1000,
            retain: config.undo_retain,
        };
        let engine = Arc::new(OrderEngine::new(
            store.clone(),
            ids,
            calendar,
            catalog,
            directory,
            notifier,
            undo,
        ));
        let schedule = Arc::new(ScheduleReader::new(store.clone(), calendar));
        let conflicts = Arc::new(ConflictDetector::new(store));

        info!(
            work_dir = %config.work_dir,
            anchor = %config.payday_anchor,
            "state initialized"
        );
        Ok(Self {
            config: config.clone(),
            engine,
            schedule,
            conflicts,
        })
    }
}

fn load_catalog(path: &str) -> anyhow::Result<JsonCatalog> {
    if Path::new(path).exists() {
        JsonCatalog::load(path).with_context(|| format!("loading catalog {path}"))
    } else {
        warn!(path, "catalog file missing, starting with an empty catalog");
        Ok(JsonCatalog::from_items(Vec::new()))
    }
}

fn load_directory(path: &str) -> anyhow::Result<JsonEmployeeDirectory> {
    if Path::new(path).exists() {
        JsonEmployeeDirectory::load(path).with_context(|| format!("loading employees {path}"))
    } else {
        warn!(path, "employee file missing, starting with an empty directory");
        Ok(JsonEmployeeDirectory::from_employees(Vec::new()))
    }
}
