//! Logging Infrastructure
//!
//! - Daily rotating application logs under `<log_dir>/app`, deleted after
//!   14 days
//! - Permanent audit logs under `<log_dir>/audit` (never deleted); every
//!   lifecycle mutation writes one line through [`audit_log!`]

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, prelude::*, EnvFilter, Layer};

const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Delete application log files older than the retention window.
/// Audit logs are left alone.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<()> {
    use chrono::{Local, TimeZone};

    let cutoff = Local::now() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);

    let app_log_dir = log_dir.join("app");
    if app_log_dir.exists() {
        for entry in fs::read_dir(app_log_dir)? {
            let entry = entry?;
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            // app-YYYY-MM-DD.log
            if let Some(date_part) = name
                .strip_prefix("app-")
                .and_then(|d| d.strip_suffix(".log"))
                && let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
                && let Some(midnight) = Local
                    .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
                    .single()
                && midnight < cutoff
            {
                fs::remove_file(&path)?;
                tracing::info!(file = %name, "Deleted old log file");
            }
        }
    }

    Ok(())
}

/// Initialize the logging system
///
/// Console output always; with a `log_dir` also a daily-rotated app log
/// and a permanent audit log, plus an hourly cleanup task.
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&str>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let Some(dir) = log_dir else {
        subscriber.with(console_layer).init();
        return Ok(());
    };

    let log_dir = Path::new(dir);
    let app_log_dir = log_dir.join("app");
    let audit_log_dir = log_dir.join("audit");
    fs::create_dir_all(&app_log_dir)?;
    fs::create_dir_all(&audit_log_dir)?;

    // Rotated daily, subject to retention cleanup
    let app_log = RollingFileAppender::new(Rotation::DAILY, app_log_dir, "app");
    let app_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::sync::Mutex::new(app_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() != "audit"
        }));

    // Permanent, never cleaned up
    let audit_log = RollingFileAppender::new(Rotation::DAILY, audit_log_dir, "audit");
    let audit_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::sync::Mutex::new(audit_log))
        .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
            meta.target() == "audit"
        }));

    tokio::spawn(periodic_cleanup(log_dir.to_path_buf()));

    subscriber
        .with(console_layer)
        .with(app_layer)
        .with(audit_layer)
        .init();
    Ok(())
}

/// Hourly cleanup of expired application logs
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{sleep, Duration};

    loop {
        sleep(Duration::from_secs(3600)).await;
        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

/// Audit log helper - records lifecycle mutations permanently
///
/// # Examples
/// ```no_run
/// benefit_server::audit_log!("mgr-1", "receive", "order:ORD-2026-0012");
/// benefit_server::audit_log!("mgr-1", "undo", "action:a1b2", "restored ORD-2026-0012");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($user_id:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = $resource,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
    ($user_id:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            user_id = $user_id,
            action = $action,
            resource = $resource,
            details = $details,
            timestamp = chrono::Local::now().to_rfc3339(),
            "AUDIT"
        );
    };
}
