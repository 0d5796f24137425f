// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP intent classifier adapter.

use async_trait::async_trait;
use leadpilot_config::model::ServiceEndpointConfig;
use leadpilot_core::types::{AdapterType, HealthStatus, IntentAnalysis, IntentRequest};
use leadpilot_core::{IntentClassifierAdapter, LeadpilotError, PluginAdapter};
use tracing::debug;

use crate::client::{ServiceClient, ServiceKind};
use crate::types::{ClassifyRequest, WireMessage};

/// Posts recent messages plus contact context and reads back an [`IntentAnalysis`].
#[derive(Debug, Clone)]
pub struct HttpIntentClassifier {
    client: ServiceClient,
}

impl HttpIntentClassifier {
    pub fn new(config: &ServiceEndpointConfig) -> Result<Self, LeadpilotError> {
        Ok(Self {
            client: ServiceClient::new(config, ServiceKind::Classifier)?,
        })
    }
}

#[async_trait]
impl PluginAdapter for HttpIntentClassifier {
    fn name(&self) -> &str {
        "http-classifier"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::IntentClassifier
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadpilotError> {
        Ok(self.client.probe().await)
    }

    async fn shutdown(&self) -> Result<(), LeadpilotError> {
        Ok(())
    }
}

#[async_trait]
impl IntentClassifierAdapter for HttpIntentClassifier {
    async fn classify(&self, request: IntentRequest) -> Result<IntentAnalysis, LeadpilotError> {
        let body = ClassifyRequest {
            model: self.client.model(),
            contact_id: &request.contact_id,
            messages: request.messages.iter().map(WireMessage::from).collect(),
            context: &request.context,
        };
        let mut analysis: IntentAnalysis = self.client.post_json(&body).await?;
        analysis.intent_score = analysis.intent_score.clamp(0.0, 100.0);
        debug!(
            contact_id = %request.contact_id,
            level = %analysis.intent_level,
            score = analysis.intent_score,
            "intent classified"
        );
        Ok(analysis)
    }
}
