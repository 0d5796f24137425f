// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock message generator that records every request.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadpilot_core::LeadpilotError;
use leadpilot_core::traits::{MessageGeneratorAdapter, PluginAdapter};
use leadpilot_core::types::{AdapterType, GeneratedMessage, GenerationRequest, HealthStatus};

/// Succeeds with a canned body unless the contact is marked as failing.
pub struct MockMessageGenerator {
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockMessageGenerator {
    pub fn new() -> Self {
        Self {
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn fail_for(&self, contact_id: &str) {
        self.failing.lock().await.insert(contact_id.to_string());
    }

    pub async fn clear_failures(&self) {
        self.failing.lock().await.clear();
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    pub async fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().await.clone()
    }

    /// Requests made for one contact, oldest first.
    pub async fn requests_for(&self, contact_id: &str) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|r| r.contact_id == contact_id)
            .cloned()
            .collect()
    }
}

impl Default for MockMessageGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockMessageGenerator {
    fn name(&self) -> &str {
        "mock-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::MessageGenerator
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadpilotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadpilotError> {
        Ok(())
    }
}

#[async_trait]
impl MessageGeneratorAdapter for MockMessageGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedMessage, LeadpilotError> {
        let contact_id = request.contact_id.clone();
        let message_type = request.message_type;
        self.requests.lock().await.push(request);

        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().await.contains(&contact_id) {
            return Err(LeadpilotError::Generator {
                message: format!("mock generator rejected {contact_id}"),
                source: None,
            });
        }
        Ok(GeneratedMessage {
            body: format!("mock {message_type} for {contact_id}"),
        })
    }
}
