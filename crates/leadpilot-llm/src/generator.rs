// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP message generator adapter.

use async_trait::async_trait;
use leadpilot_config::model::ServiceEndpointConfig;
use leadpilot_core::types::{AdapterType, GeneratedMessage, GenerationRequest, HealthStatus};
use leadpilot_core::{LeadpilotError, MessageGeneratorAdapter, PluginAdapter};
use tracing::debug;

use crate::client::{ServiceClient, ServiceKind};
use crate::types::{GenerateRequest, GenerateResponse};

/// Asks the generator service to produce and dispatch a message.
#[derive(Debug, Clone)]
pub struct HttpMessageGenerator {
    client: ServiceClient,
}

impl HttpMessageGenerator {
    pub fn new(config: &ServiceEndpointConfig) -> Result<Self, LeadpilotError> {
        Ok(Self {
            client: ServiceClient::new(config, ServiceKind::Generator)?,
        })
    }
}

#[async_trait]
impl PluginAdapter for HttpMessageGenerator {
    fn name(&self) -> &str {
        "http-generator"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::MessageGenerator
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadpilotError> {
        Ok(self.client.probe().await)
    }

    async fn shutdown(&self) -> Result<(), LeadpilotError> {
        Ok(())
    }
}

#[async_trait]
impl MessageGeneratorAdapter for HttpMessageGenerator {
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedMessage, LeadpilotError> {
        let body = GenerateRequest {
            model: self.client.model(),
            contact_id: &request.contact_id,
            assignment_id: &request.assignment_id,
            message_type: request.message_type,
            channel: request.channel,
            campaign_id: request.trigger.campaign_id.as_deref(),
            campaign_strategy: request.trigger.campaign_strategy.as_deref(),
            previous_agent_type: request.trigger.previous_agent_type,
        };
        let response: GenerateResponse = self.client.post_json(&body).await?;
        if response.body.trim().is_empty() {
            return Err(LeadpilotError::Generator {
                message: "generator returned an empty message".into(),
                source: None,
            });
        }
        debug!(
            contact_id = %request.contact_id,
            message_type = %request.message_type,
            "message generated"
        );
        Ok(GeneratedMessage {
            body: response.body,
        })
    }
}
