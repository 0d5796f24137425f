// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classifier adapter trait.

use async_trait::async_trait;

use crate::error::LeadpilotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{IntentAnalysis, IntentRequest};

/// Adapter for the language-model buying-intent classifier.
///
/// Callers treat this as best-effort: the scoring engine replaces any error
/// with [`IntentAnalysis::neutral`].
#[async_trait]
pub trait IntentClassifierAdapter: PluginAdapter {
    /// Classifies the buying intent expressed in the request's messages.
    async fn classify(&self, request: IntentRequest) -> Result<IntentAnalysis, LeadpilotError>;
}
