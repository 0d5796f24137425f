// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs with strict validation.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject typos at parse time.

use std::collections::BTreeMap;

use leadpilot_core::types::{AgentLifetime, AgentType, Channel};
use serde::{Deserialize, Serialize};

/// Top-level Leadpilot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LeadpilotConfig {
    /// Service identity and logging.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Lead scoring settings.
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Agent assignment settings.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Campaign activation settings.
    #[serde(default)]
    pub campaign: CampaignConfig,

    /// Intent classification service.
    #[serde(default)]
    pub classifier: ServiceEndpointConfig,

    /// Message generation service.
    #[serde(default)]
    pub generator: ServiceEndpointConfig,
}

/// Service identity and logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name reported in logs and `doctor` output.
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Default log level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_service_name() -> String {
    "leadpilot".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|d| d.join("leadpilot").join("leadpilot.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "leadpilot.db".to_string())
}

fn default_true() -> bool {
    true
}

/// Lead scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoringConfig {
    /// Upper bound on a single intent classification call.
    #[serde(default = "default_classifier_timeout_secs")]
    pub classifier_timeout_secs: u64,

    /// Number of recent messages handed to the classifier.
    #[serde(default = "default_recent_message_limit")]
    pub recent_message_limit: usize,

    /// Attempts before a queued scoring job is abandoned.
    #[serde(default = "default_job_max_attempts")]
    pub job_max_attempts: i32,

    /// Idle sleep between queue polls in the background worker.
    #[serde(default = "default_worker_poll_interval_secs")]
    pub worker_poll_interval_secs: u64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            classifier_timeout_secs: default_classifier_timeout_secs(),
            recent_message_limit: default_recent_message_limit(),
            job_max_attempts: default_job_max_attempts(),
            worker_poll_interval_secs: default_worker_poll_interval_secs(),
        }
    }
}

fn default_classifier_timeout_secs() -> u64 {
    10
}

fn default_recent_message_limit() -> usize {
    10
}

fn default_job_max_attempts() -> i32 {
    3
}

fn default_worker_poll_interval_secs() -> u64 {
    5
}

/// Agent orchestration configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrchestratorConfig {
    /// Default help mode window when none is given.
    #[serde(default = "default_help_mode_minutes")]
    pub help_mode_minutes: u32,

    /// Per agent type lifetime overrides in days. `0` means indefinite.
    #[serde(default)]
    pub lifetime_days: BTreeMap<AgentType, u32>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            help_mode_minutes: default_help_mode_minutes(),
            lifetime_days: BTreeMap::new(),
        }
    }
}

impl OrchestratorConfig {
    /// Resolves the lifetime for an agent type, applying any override.
    pub fn lifetime_for(&self, agent_type: AgentType) -> AgentLifetime {
        match self.lifetime_days.get(&agent_type) {
            Some(0) => AgentLifetime::Indefinite,
            Some(days) => AgentLifetime::Days(*days),
            None => agent_type.default_lifetime(),
        }
    }
}

fn default_help_mode_minutes() -> u32 {
    30
}

/// Campaign activation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignConfig {
    /// Upper bound on generating one introduction message.
    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,

    /// Channel used when a campaign does not specify one.
    #[serde(default = "default_channel")]
    pub default_channel: Channel,
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            generation_timeout_secs: default_generation_timeout_secs(),
            default_channel: default_channel(),
        }
    }
}

fn default_generation_timeout_secs() -> u64 {
    15
}

fn default_channel() -> Channel {
    Channel::Sms
}

/// Connection settings for an external HTTP service.
///
/// An absent `endpoint` disables the HTTP adapter; scoring then falls back to
/// neutral intent and campaign activation refuses to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceEndpointConfig {
    /// Base URL of the service.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Bearer token sent with each request.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model identifier forwarded to the service.
    #[serde(default)]
    pub model: Option<String>,

    /// Per request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServiceEndpointConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            model: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_request_timeout_secs() -> u64 {
    30
}
