// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire types for the classifier and generator services.

use chrono::{DateTime, Utc};
use leadpilot_core::types::{
    AgentType, Channel, ContactMessage, IntentContext, MessageDirection, MessageType,
};
use serde::{Deserialize, Serialize};

/// Body posted to the intent classifier.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifyRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub contact_id: &'a str,
    /// Newest first.
    pub messages: Vec<WireMessage<'a>>,
    pub context: &'a IntentContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireMessage<'a> {
    pub direction: MessageDirection,
    pub channel: Channel,
    pub body: &'a str,
    pub sent_at: DateTime<Utc>,
}

impl<'a> From<&'a ContactMessage> for WireMessage<'a> {
    fn from(message: &'a ContactMessage) -> Self {
        Self {
            direction: message.direction,
            channel: message.channel,
            body: &message.body,
            sent_at: message.created_at,
        }
    }
}

/// Body posted to the message generator.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<&'a str>,
    pub contact_id: &'a str,
    pub assignment_id: &'a str,
    pub message_type: MessageType,
    pub channel: Channel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_strategy: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_agent_type: Option<AgentType>,
}

/// Generator response. Extra fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(alias = "message", alias = "text")]
    pub body: String,
}

/// Error envelope returned by both services on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(rename = "type")]
    pub type_: String,
    pub message: String,
}
