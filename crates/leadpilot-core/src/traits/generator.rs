// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message generation adapter trait.

use async_trait::async_trait;

use crate::error::LeadpilotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{GeneratedMessage, GenerationRequest};

/// Adapter for the service that drafts agent messages.
#[async_trait]
pub trait MessageGeneratorAdapter: PluginAdapter {
    /// Generates and dispatches a message for the given assignment.
    async fn generate(
        &self,
        request: GenerationRequest,
    ) -> Result<GeneratedMessage, LeadpilotError>;
}
