// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Covers constraints serde cannot express: non-empty paths, positive
//! timeouts, bounded agent lifetimes, parseable endpoint URLs and known log
//! levels.

use crate::diagnostic::ConfigError;
use crate::model::{LeadpilotConfig, ServiceEndpointConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Longest configurable agent lifetime, roughly a century.
pub const MAX_LIFETIME_DAYS: u32 = 36_500;

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every failure rather than stopping at the first.
pub fn validate_config(config: &LeadpilotConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if !LOG_LEVELS.contains(&config.service.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "service.log_level `{}` must be one of {}",
                config.service.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    positive(
        &mut errors,
        "scoring.classifier_timeout_secs",
        config.scoring.classifier_timeout_secs,
    );
    positive(
        &mut errors,
        "scoring.worker_poll_interval_secs",
        config.scoring.worker_poll_interval_secs,
    );
    positive(
        &mut errors,
        "campaign.generation_timeout_secs",
        config.campaign.generation_timeout_secs,
    );
    positive(
        &mut errors,
        "orchestrator.help_mode_minutes",
        u64::from(config.orchestrator.help_mode_minutes),
    );

    for (agent_type, days) in &config.orchestrator.lifetime_days {
        if *days > MAX_LIFETIME_DAYS {
            errors.push(ConfigError::Validation {
                message: format!(
                    "orchestrator.lifetime_days.{agent_type} must be at most {MAX_LIFETIME_DAYS}, got {days} (use 0 for indefinite)"
                ),
            });
        }
    }

    if config.scoring.recent_message_limit == 0 {
        errors.push(ConfigError::Validation {
            message: "scoring.recent_message_limit must be at least 1".to_string(),
        });
    }

    if config.scoring.job_max_attempts < 1 {
        errors.push(ConfigError::Validation {
            message: format!(
                "scoring.job_max_attempts must be at least 1, got {}",
                config.scoring.job_max_attempts
            ),
        });
    }

    validate_endpoint(&mut errors, "classifier", &config.classifier);
    validate_endpoint(&mut errors, "generator", &config.generator);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn positive(errors: &mut Vec<ConfigError>, key: &str, value: u64) {
    if value == 0 {
        errors.push(ConfigError::Validation {
            message: format!("{key} must be greater than zero"),
        });
    }
}

fn validate_endpoint(errors: &mut Vec<ConfigError>, section: &str, cfg: &ServiceEndpointConfig) {
    if let Some(endpoint) = cfg.endpoint.as_deref() {
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            errors.push(ConfigError::Validation {
                message: format!("{section}.endpoint `{endpoint}` must be an http(s) URL"),
            });
        }
    }
    positive(
        errors,
        &format!("{section}.request_timeout_secs"),
        cfg.request_timeout_secs,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadpilot_core::AgentType;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&LeadpilotConfig::default()).is_ok());
    }

    #[test]
    fn empty_database_path_fails() {
        let mut config = LeadpilotConfig::default();
        config.storage.database_path = "   ".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(format!("{}", errors[0]).contains("database_path"));
    }

    #[test]
    fn collects_multiple_errors() {
        let mut config = LeadpilotConfig::default();
        config.scoring.classifier_timeout_secs = 0;
        config.scoring.job_max_attempts = 0;
        config.service.log_level = "loud".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn oversized_lifetime_rejected() {
        let mut config = LeadpilotConfig::default();
        config
            .orchestrator
            .lifetime_days
            .insert(AgentType::Sales, 200_000_000);
        config
            .orchestrator
            .lifetime_days
            .insert(AgentType::Retention, MAX_LIFETIME_DAYS);
        config
            .orchestrator
            .lifetime_days
            .insert(AgentType::CustomerService, 0);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(format!("{}", errors[0]).contains("lifetime_days.sales"));
    }

    #[test]
    fn non_http_endpoint_rejected() {
        let mut config = LeadpilotConfig::default();
        config.generator.endpoint = Some("ftp://example.com".to_string());
        let errors = validate_config(&config).unwrap_err();
        assert!(format!("{}", errors[0]).contains("generator.endpoint"));
    }

    #[test]
    fn https_endpoint_accepted() {
        let mut config = LeadpilotConfig::default();
        config.classifier.endpoint = Some("https://intent.internal".to_string());
        assert!(validate_config(&config).is_ok());
    }
}
