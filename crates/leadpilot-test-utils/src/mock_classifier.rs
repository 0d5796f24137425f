// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock intent classifier for deterministic scoring tests.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadpilot_core::LeadpilotError;
use leadpilot_core::traits::{IntentClassifierAdapter, PluginAdapter};
use leadpilot_core::types::{AdapterType, HealthStatus, IntentAnalysis, IntentRequest};

/// Returns canned analyses, per contact or a shared default.
///
/// Contacts registered with [`fail_for`](Self::fail_for) get a classifier
/// error. A configured delay is applied before every answer.
pub struct MockIntentClassifier {
    default: Mutex<IntentAnalysis>,
    per_contact: Mutex<HashMap<String, IntentAnalysis>>,
    failing: Mutex<HashSet<String>>,
    delay: Mutex<Option<Duration>>,
    requests: Mutex<Vec<IntentRequest>>,
}

impl MockIntentClassifier {
    /// A classifier answering neutral intent for everyone.
    pub fn new() -> Self {
        Self::with_default(IntentAnalysis::neutral())
    }

    pub fn with_default(analysis: IntentAnalysis) -> Self {
        Self {
            default: Mutex::new(analysis),
            per_contact: Mutex::new(HashMap::new()),
            failing: Mutex::new(HashSet::new()),
            delay: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub async fn set_default(&self, analysis: IntentAnalysis) {
        *self.default.lock().await = analysis;
    }

    pub async fn set_intent(&self, contact_id: &str, analysis: IntentAnalysis) {
        self.per_contact
            .lock()
            .await
            .insert(contact_id.to_string(), analysis);
    }

    pub async fn fail_for(&self, contact_id: &str) {
        self.failing.lock().await.insert(contact_id.to_string());
    }

    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.lock().await = Some(delay);
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<IntentRequest> {
        self.requests.lock().await.clone()
    }
}

impl Default for MockIntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockIntentClassifier {
    fn name(&self) -> &str {
        "mock-classifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::IntentClassifier
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadpilotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadpilotError> {
        Ok(())
    }
}

#[async_trait]
impl IntentClassifierAdapter for MockIntentClassifier {
    async fn classify(&self, request: IntentRequest) -> Result<IntentAnalysis, LeadpilotError> {
        let contact_id = request.contact_id.clone();
        self.requests.lock().await.push(request);

        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().await.contains(&contact_id) {
            return Err(LeadpilotError::Classifier {
                message: format!("mock classifier failure for {contact_id}"),
                source: None,
            });
        }
        if let Some(analysis) = self.per_contact.lock().await.get(&contact_id) {
            return Ok(analysis.clone());
        }
        Ok(self.default.lock().await.clone())
    }
}
