// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Activation reporting.

use leadpilot_core::types::AgentType;
use serde::Serialize;

/// One membership that could not be activated in this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactFailure {
    pub contact_id: String,
    pub message: String,
}

/// A member whose campaign agent was queued instead of activated.
///
/// No message was generated and the membership status was left as it was,
/// so a later run picks the member up again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredContact {
    pub contact_id: String,
    /// The agent holding the active slot, if any.
    pub active_agent: Option<AgentType>,
}

/// Counts reported by an activation or retry run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationSummary {
    pub campaign_id: String,
    /// Members that got an assignment and a generated message in this run.
    pub activated_count: usize,
    /// Every membership row of the campaign.
    pub total_contacts: usize,
    /// Members left alone because they were not eligible for this run.
    pub skipped_count: usize,
    pub deferred: Vec<DeferredContact>,
    pub failures: Vec<ContactFailure>,
}

impl ActivationSummary {
    pub(crate) fn new(campaign_id: &str, total_contacts: usize) -> Self {
        Self {
            campaign_id: campaign_id.to_string(),
            activated_count: 0,
            total_contacts,
            skipped_count: 0,
            deferred: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }
}
