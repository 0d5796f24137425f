// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment resolver adapter trait.

use async_trait::async_trait;

use crate::error::LeadpilotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::AudienceFilter;

/// Adapter that turns a stored audience filter into contact ids.
#[async_trait]
pub trait SegmentResolverAdapter: PluginAdapter {
    /// Returns the ids of every contact matching `filter`, in a stable order.
    async fn resolve(&self, filter: &AudienceFilter) -> Result<Vec<String>, LeadpilotError>;
}
