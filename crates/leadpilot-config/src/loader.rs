// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `./leadpilot.toml` > `~/.config/leadpilot/leadpilot.toml` >
//! `/etc/leadpilot/leadpilot.toml`, with `LEADPILOT_` environment overrides on top.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LeadpilotConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/leadpilot/leadpilot.toml";

/// Configuration file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "leadpilot.toml";

/// Sections recognised by the env provider, longest first so that no
/// section name is a prefix of another one that is checked later.
const ENV_SECTIONS: &[&str] = &[
    "orchestrator",
    "classifier",
    "generator",
    "campaign",
    "service",
    "storage",
    "scoring",
];

/// Path of the per-user configuration file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("leadpilot").join("leadpilot.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/leadpilot/leadpilot.toml`
/// 3. `~/.config/leadpilot/leadpilot.toml`
/// 4. `./leadpilot.toml`
/// 5. `LEADPILOT_*` environment variables
pub fn load_config() -> Result<LeadpilotConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LeadpilotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadpilotConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LeadpilotConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LeadpilotConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new()
        .merge(Serialized::defaults(LeadpilotConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH));
    if let Some(user) = user_config_path() {
        figment = figment.merge(Toml::file(user));
    }
    figment
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Environment provider with explicit section-to-dot mapping.
///
/// `Env::split("_")` would turn `LEADPILOT_STORAGE_DATABASE_PATH` into
/// `storage.database.path`; only the first segment is a section.
fn env_provider() -> Env {
    Env::prefixed("LEADPILOT_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|r| r.strip_prefix('_'))
        {
            // LEADPILOT_ORCHESTRATOR_LIFETIME_DAYS_SALES -> orchestrator.lifetime_days.sales
            if let Some(agent) = rest.strip_prefix("lifetime_days_") {
                return format!("{section}.lifetime_days.{agent}");
            }
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_section_keys_with_underscores() {
        assert_eq!(
            map_env_key("storage_database_path"),
            "storage.database_path"
        );
        assert_eq!(
            map_env_key("scoring_classifier_timeout_secs"),
            "scoring.classifier_timeout_secs"
        );
        assert_eq!(map_env_key("classifier_api_key"), "classifier.api_key");
    }

    #[test]
    fn maps_lifetime_overrides() {
        assert_eq!(
            map_env_key("orchestrator_lifetime_days_customer_service"),
            "orchestrator.lifetime_days.customer_service"
        );
    }

    #[test]
    fn unknown_section_passes_through() {
        assert_eq!(map_env_key("bogus_key"), "bogus_key");
    }
}
