// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadpilot doctor` command implementation.
//!
//! Runs diagnostic checks against the configuration, the database, and the
//! external classifier and generator services.

use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

use leadpilot_config::LeadpilotConfig;
use leadpilot_config::model::ServiceEndpointConfig;
use leadpilot_core::{HealthStatus, LeadpilotError, PluginAdapter, StorageAdapter};
use leadpilot_llm::{HttpIntentClassifier, HttpMessageGenerator};
use leadpilot_storage::SqliteStorage;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed successfully.
    Pass,
    /// Check passed with a warning.
    Warn,
    /// Check failed.
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    /// Name of the check.
    pub name: String,
    /// Check status.
    pub status: CheckStatus,
    /// Human-readable message.
    pub message: String,
    /// Duration the check took.
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, start: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: start.elapsed(),
        }
    }
}

/// Run the `leadpilot doctor` command.
///
/// Runs quick diagnostic checks. With `--deep`, runs additional intensive checks.
/// With `--plain`, disables colored output.
pub async fn run_doctor(
    config: &LeadpilotConfig,
    config_path: Option<&Path>,
    deep: bool,
    plain: bool,
) -> Result<(), LeadpilotError> {
    let use_color = !plain && std::io::stdout().is_terminal();
    let mut results = Vec::new();

    // Quick checks (always run)
    results.push(check_config(config_path).await);
    results.push(check_database(&config.storage.database_path).await);
    results.push(check_storage(config).await);
    results.push(check_classifier(&config.classifier).await);
    results.push(check_generator(&config.generator).await);

    // Deep checks (only with --deep)
    if deep {
        results.push(check_db_integrity(&config.storage.database_path).await);
        results.push(check_memory_baseline().await);
    }

    println!();
    println!("  leadpilot doctor");
    println!("  {}", "-".repeat(50));

    let mut fail_count = 0;
    let mut warn_count = 0;

    for result in &results {
        let duration_ms = result.duration.as_millis();
        let line = match result.status {
            CheckStatus::Pass => {
                if use_color {
                    use colored::Colorize;
                    format!(
                        "    {} {:<20} {} ({duration_ms}ms)",
                        "✓".green(),
                        result.name,
                        result.message
                    )
                } else {
                    format!(
                        "    [OK]   {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    )
                }
            }
            CheckStatus::Warn => {
                warn_count += 1;
                if use_color {
                    use colored::Colorize;
                    format!(
                        "    {} {:<20} {} ({duration_ms}ms)",
                        "!".yellow(),
                        result.name,
                        result.message.yellow()
                    )
                } else {
                    format!(
                        "    [WARN] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    )
                }
            }
            CheckStatus::Fail => {
                fail_count += 1;
                if use_color {
                    use colored::Colorize;
                    format!(
                        "    {} {:<20} {} ({duration_ms}ms)",
                        "✗".red(),
                        result.name,
                        result.message.red()
                    )
                } else {
                    format!(
                        "    [FAIL] {:<20} {} ({duration_ms}ms)",
                        result.name, result.message
                    )
                }
            }
        };
        println!("{line}");
    }

    println!();

    if fail_count > 0 || warn_count > 0 {
        let issues = fail_count + warn_count;
        let issue_word = if issues == 1 { "issue" } else { "issues" };
        println!("  {issues} {issue_word} found.");
        if !deep {
            println!("  Run with --deep for detailed diagnostics.");
        }
    } else {
        println!("  All checks passed.");
    }

    println!();

    Ok(())
}

/// Check configuration loads without errors.
async fn check_config(config_path: Option<&Path>) -> CheckResult {
    let start = Instant::now();
    let loaded = match config_path {
        Some(path) => leadpilot_config::load_and_validate_path(path),
        None => leadpilot_config::load_and_validate(),
    };
    match loaded {
        Ok(_) => CheckResult::new("Configuration", CheckStatus::Pass, "valid", start),
        Err(errors) => CheckResult::new(
            "Configuration",
            CheckStatus::Fail,
            format!("{} error(s)", errors.len()),
            start,
        ),
    }
}

/// Check database file exists and can be opened.
async fn check_database(db_path: &str) -> CheckResult {
    let start = Instant::now();

    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "Database",
            CheckStatus::Warn,
            format!("not found: {db_path} (will be created on first run)"),
            start,
        );
    }

    match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => {
            let query_result = conn
                .call(|conn| -> rusqlite::Result<()> {
                    conn.execute_batch("SELECT 1")?;
                    Ok(())
                })
                .await;

            match query_result {
                Ok(()) => CheckResult::new("Database", CheckStatus::Pass, "connected", start),
                Err(e) => CheckResult::new(
                    "Database",
                    CheckStatus::Fail,
                    format!("query failed: {e}"),
                    start,
                ),
            }
        }
        Err(e) => CheckResult::new(
            "Database",
            CheckStatus::Fail,
            format!("open failed: {e}"),
            start,
        ),
    }
}

fn health_result(name: &str, health: Result<HealthStatus, LeadpilotError>, start: Instant) -> CheckResult {
    match health {
        Ok(HealthStatus::Healthy) => CheckResult::new(name, CheckStatus::Pass, "healthy", start),
        Ok(HealthStatus::Degraded(reason)) => CheckResult::new(name, CheckStatus::Warn, reason, start),
        Ok(HealthStatus::Unhealthy(reason)) => CheckResult::new(name, CheckStatus::Fail, reason, start),
        Err(e) => CheckResult::new(name, CheckStatus::Fail, e.to_string(), start),
    }
}

/// Opens the store with migrations and runs the adapter health check.
async fn check_storage(config: &LeadpilotConfig) -> CheckResult {
    let start = Instant::now();

    if !Path::new(&config.storage.database_path).exists() {
        return CheckResult::new("Storage", CheckStatus::Warn, "database not found (skipped)", start);
    }

    let storage = SqliteStorage::new(config.storage.clone());
    if let Err(e) = storage.initialize().await {
        return CheckResult::new("Storage", CheckStatus::Fail, format!("migrations failed: {e}"), start);
    }
    let result = health_result("Storage", storage.health_check().await, start);
    let _ = storage.close().await;
    result
}

async fn check_classifier(config: &ServiceEndpointConfig) -> CheckResult {
    let start = Instant::now();
    if config.endpoint.is_none() {
        return CheckResult::new(
            "Intent classifier",
            CheckStatus::Warn,
            "not configured (scoring uses neutral intent)",
            start,
        );
    }
    match HttpIntentClassifier::new(config) {
        Ok(classifier) => health_result("Intent classifier", classifier.health_check().await, start),
        Err(e) => CheckResult::new("Intent classifier", CheckStatus::Fail, e.to_string(), start),
    }
}

async fn check_generator(config: &ServiceEndpointConfig) -> CheckResult {
    let start = Instant::now();
    if config.endpoint.is_none() {
        return CheckResult::new(
            "Message generator",
            CheckStatus::Warn,
            "not configured (campaign activation unavailable)",
            start,
        );
    }
    match HttpMessageGenerator::new(config) {
        Ok(generator) => health_result("Message generator", generator.health_check().await, start),
        Err(e) => CheckResult::new("Message generator", CheckStatus::Fail, e.to_string(), start),
    }
}

/// Deep check: SQLite integrity check.
async fn check_db_integrity(db_path: &str) -> CheckResult {
    let start = Instant::now();

    if !Path::new(db_path).exists() {
        return CheckResult::new(
            "DB integrity",
            CheckStatus::Warn,
            "database not found (skipped)",
            start,
        );
    }

    match tokio_rusqlite::Connection::open(db_path).await {
        Ok(conn) => {
            let result = conn
                .call(|conn| -> rusqlite::Result<Vec<String>> {
                    let mut stmt = conn.prepare("PRAGMA integrity_check")?;
                    let rows: Vec<String> = stmt
                        .query_map([], |row| row.get(0))?
                        .filter_map(|r| r.ok())
                        .collect();
                    Ok(rows)
                })
                .await;

            match result {
                Ok(rows) if rows.len() == 1 && rows[0] == "ok" => {
                    CheckResult::new("DB integrity", CheckStatus::Pass, "ok", start)
                }
                Ok(rows) => CheckResult::new(
                    "DB integrity",
                    CheckStatus::Fail,
                    format!("{} issue(s) found", rows.len()),
                    start,
                ),
                Err(e) => CheckResult::new(
                    "DB integrity",
                    CheckStatus::Fail,
                    format!("check failed: {e}"),
                    start,
                ),
            }
        }
        Err(e) => CheckResult::new(
            "DB integrity",
            CheckStatus::Fail,
            format!("open failed: {e}"),
            start,
        ),
    }
}

/// Deep check: memory baseline via jemalloc.
async fn check_memory_baseline() -> CheckResult {
    let start = Instant::now();

    #[cfg(not(target_env = "msvc"))]
    {
        let _ = tikv_jemalloc_ctl::epoch::advance();
        let allocated = tikv_jemalloc_ctl::stats::allocated::read().unwrap_or(0);
        let resident = tikv_jemalloc_ctl::stats::resident::read().unwrap_or(0);
        let allocated_mb = allocated as f64 / (1024.0 * 1024.0);
        let resident_mb = resident as f64 / (1024.0 * 1024.0);

        CheckResult::new(
            "Memory baseline",
            CheckStatus::Pass,
            format!("heap: {allocated_mb:.1} MB, resident: {resident_mb:.1} MB"),
            start,
        )
    }

    #[cfg(target_env = "msvc")]
    {
        CheckResult::new(
            "Memory baseline",
            CheckStatus::Warn,
            "jemalloc not available on MSVC",
            start,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadpilot_config::model::StorageConfig;

    const MISSING_DB: &str = "/tmp/nonexistent-leadpilot-test-xyz.db";

    #[test]
    fn check_result_has_required_fields() {
        let result = CheckResult {
            name: "test".to_string(),
            status: CheckStatus::Pass,
            message: "ok".to_string(),
            duration: Duration::from_millis(5),
        };
        assert_eq!(result.name, "test");
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.duration.as_millis(), 5);
    }

    #[test]
    fn health_status_maps_to_check_status() {
        let start = Instant::now();
        assert_eq!(
            health_result("x", Ok(HealthStatus::Healthy), start).status,
            CheckStatus::Pass
        );
        let degraded = health_result("x", Ok(HealthStatus::Degraded("slow".into())), start);
        assert_eq!(degraded.status, CheckStatus::Warn);
        assert_eq!(degraded.message, "slow");
        assert_eq!(
            health_result("x", Ok(HealthStatus::Unhealthy("down".into())), start).status,
            CheckStatus::Fail
        );
        assert_eq!(
            health_result("x", Err(LeadpilotError::Internal("boom".into())), start).status,
            CheckStatus::Fail
        );
    }

    #[tokio::test]
    async fn check_config_passes_with_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadpilot.toml");
        std::fs::write(&path, "[scoring]\nclassifier_timeout_secs = 5\n").unwrap();
        let result = check_config(Some(&path)).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert_eq!(result.name, "Configuration");
    }

    #[tokio::test]
    async fn check_config_fails_on_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadpilot.toml");
        std::fs::write(&path, "[scoring]\nclassifier_timeout = 5\n").unwrap();
        let result = check_config(Some(&path)).await;
        assert_eq!(result.status, CheckStatus::Fail);
    }

    #[tokio::test]
    async fn check_database_missing_warns() {
        let result = check_database(MISSING_DB).await;
        assert_eq!(result.status, CheckStatus::Warn);
        assert!(result.message.contains("not found"));
    }

    #[tokio::test]
    async fn check_storage_passes_on_fresh_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("leadpilot.db");
        std::fs::File::create(&path).unwrap();
        let config = LeadpilotConfig {
            storage: StorageConfig {
                database_path: path.display().to_string(),
                wal_mode: true,
            },
            ..Default::default()
        };
        let result = check_storage(&config).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
    }

    #[tokio::test]
    async fn unconfigured_services_warn() {
        let config = ServiceEndpointConfig::default();
        assert_eq!(check_classifier(&config).await.status, CheckStatus::Warn);
        assert_eq!(check_generator(&config).await.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn check_db_integrity_missing_warns() {
        let result = check_db_integrity(MISSING_DB).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[tokio::test]
    async fn check_memory_baseline_passes() {
        let result = check_memory_baseline().await;
        assert!(
            result.status == CheckStatus::Pass || result.status == CheckStatus::Warn
        );
    }
}
