use chrono::NaiveDate;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/benefit | Working directory (database, logs, seed data) |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | PAYDAY_ANCHOR | 2023-01-06 | A known payday Friday anchoring the bi-weekly cadence |
/// | ID_LOCK_TIMEOUT_SECS | 5 | Bounded wait for the id sequence lock |
/// | UNDO_WINDOW_HOURS | 12 | How long a ledger entry stays undoable |
/// | UNDO_RETAIN | 10 | Ledger entries kept |
/// | CATALOG_FILE | <WORK_DIR>/catalog.json | Uniform catalog seed |
/// | EMPLOYEES_FILE | <WORK_DIR>/employees.json | Employee directory seed |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/benefit HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database, logs and seed files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    /// A known payday Friday; every payday is a 14-day multiple away
    pub payday_anchor: NaiveDate,
    /// Bounded wait for the id sequence lock, in seconds
    pub id_lock_timeout_secs: u64,
    /// Undo window, in hours
    pub undo_window_hours: i64,
    /// Undo ledger entries retained
    pub undo_retain: usize,
    /// Uniform catalog seed file
    pub catalog_file: String,
    /// Employee directory seed file
    pub employees_file: String,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        let work_dir =
            std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/benefit".to_string());
        Self {
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            payday_anchor: std::env::var("PAYDAY_ANCHOR")
                .ok()
                .and_then(|v| NaiveDate::parse_from_str(&v, "%Y-%m-%d").ok())
                .unwrap_or_else(|| NaiveDate::from_ymd_opt(2023, 1, 6).unwrap_or_default()),
            id_lock_timeout_secs: std::env::var("ID_LOCK_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            undo_window_hours: std::env::var("UNDO_WINDOW_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(12),
            undo_retain: std::env::var("UNDO_RETAIN")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            catalog_file: std::env::var("CATALOG_FILE")
                .unwrap_or_else(|_| format!("{work_dir}/catalog.json")),
            employees_file: std::env::var("EMPLOYEES_FILE")
                .unwrap_or_else(|_| format!("{work_dir}/employees.json")),
            work_dir,
        }
    }

    /// Override the paths and port, for tests
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        let work_dir = work_dir.into();
        config.catalog_file = format!("{work_dir}/catalog.json");
        config.employees_file = format!("{work_dir}/employees.json");
        config.work_dir = work_dir;
        config.http_port = http_port;
        config
    }

    pub fn database_path(&self) -> String {
        format!("{}/orders.redb", self.work_dir)
    }

    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
