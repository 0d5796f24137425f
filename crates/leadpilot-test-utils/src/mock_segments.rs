// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment resolver returning a fixed contact list.

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadpilot_core::LeadpilotError;
use leadpilot_core::traits::{PluginAdapter, SegmentResolverAdapter};
use leadpilot_core::types::{AdapterType, AudienceFilter, HealthStatus};

pub struct StaticSegmentResolver {
    contact_ids: Mutex<Vec<String>>,
    failure: Mutex<Option<String>>,
    calls: Mutex<usize>,
}

impl StaticSegmentResolver {
    pub fn new(contact_ids: Vec<String>) -> Self {
        Self {
            contact_ids: Mutex::new(contact_ids),
            failure: Mutex::new(None),
            calls: Mutex::new(0),
        }
    }

    pub async fn set_contacts(&self, contact_ids: Vec<String>) {
        *self.contact_ids.lock().await = contact_ids;
    }

    /// Makes every later `resolve` call fail with `message`.
    pub async fn fail_with(&self, message: &str) {
        *self.failure.lock().await = Some(message.to_string());
    }

    pub async fn calls(&self) -> usize {
        *self.calls.lock().await
    }
}

#[async_trait]
impl PluginAdapter for StaticSegmentResolver {
    fn name(&self) -> &str {
        "static-segments"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SegmentResolver
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadpilotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadpilotError> {
        Ok(())
    }
}

#[async_trait]
impl SegmentResolverAdapter for StaticSegmentResolver {
    async fn resolve(&self, _filter: &AudienceFilter) -> Result<Vec<String>, LeadpilotError> {
        *self.calls.lock().await += 1;
        if let Some(message) = self.failure.lock().await.clone() {
            return Err(LeadpilotError::Segment {
                message,
                source: None,
            });
        }
        Ok(self.contact_ids.lock().await.clone())
    }
}
