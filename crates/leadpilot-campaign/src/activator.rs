// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign activation pipeline.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use leadpilot_config::model::CampaignConfig;
use leadpilot_core::types::{
    AgentType, Campaign, CampaignContact, CampaignContactError, CampaignStatus, GenerationRequest,
    MembershipStatus, MessageType, TriggerContext,
};
use leadpilot_core::{LeadpilotError, MessageGeneratorAdapter, SegmentResolverAdapter, StorageAdapter};
use leadpilot_orchestrator::AgentOrchestrator;
use tracing::{debug, info, instrument, warn};

use crate::summary::{ActivationSummary, ContactFailure, DeferredContact};

/// What happened to a member that did not fail.
enum MemberOutcome {
    Activated,
    /// The campaign agent was assigned but another agent holds the active slot.
    Deferred { active_agent: Option<AgentType> },
}

/// Why a single member could not be activated.
struct MemberFailure {
    message: String,
    raw_error: String,
    message_type: MessageType,
}

/// Activates campaign members one contact at a time.
///
/// A failing member is recorded on its membership row and the run moves on.
/// Only batch-level problems (unknown campaign, segment resolution, storage
/// failures while recording results) abort the call.
pub struct CampaignActivator {
    storage: Arc<dyn StorageAdapter>,
    orchestrator: Arc<AgentOrchestrator>,
    generator: Arc<dyn MessageGeneratorAdapter>,
    segments: Arc<dyn SegmentResolverAdapter>,
    generation_timeout: Duration,
}

impl CampaignActivator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        orchestrator: Arc<AgentOrchestrator>,
        generator: Arc<dyn MessageGeneratorAdapter>,
        segments: Arc<dyn SegmentResolverAdapter>,
        config: &CampaignConfig,
    ) -> Self {
        Self {
            storage,
            orchestrator,
            generator,
            segments,
            generation_timeout: Duration::from_secs(config.generation_timeout_secs),
        }
    }

    /// Activates every `pending` or `active` member. `failed` members are skipped.
    ///
    /// A campaign without members first resolves its audience filter into
    /// membership rows.
    #[instrument(skip(self))]
    pub async fn activate(&self, campaign_id: &str) -> Result<ActivationSummary, LeadpilotError> {
        let campaign = self.load_campaign(campaign_id).await?;
        let mut members = self.storage.list_campaign_contacts(campaign_id).await?;
        if members.is_empty() {
            members = self.populate_members(&campaign).await?;
        }

        let (targets, skipped): (Vec<_>, Vec<_>) = members
            .iter()
            .partition(|m| matches!(m.status, MembershipStatus::Pending | MembershipStatus::Active));
        self.run(&campaign, members.len(), targets, skipped.len())
            .await
    }

    /// Re-drives only the `failed` members. Successful members are not touched.
    #[instrument(skip(self))]
    pub async fn retry_failed(
        &self,
        campaign_id: &str,
    ) -> Result<ActivationSummary, LeadpilotError> {
        let campaign = self.load_campaign(campaign_id).await?;
        let members = self.storage.list_campaign_contacts(campaign_id).await?;
        let (targets, skipped): (Vec<_>, Vec<_>) = members
            .iter()
            .partition(|m| m.status == MembershipStatus::Failed);
        self.run(&campaign, members.len(), targets, skipped.len())
            .await
    }

    async fn load_campaign(&self, campaign_id: &str) -> Result<Campaign, LeadpilotError> {
        let campaign = self
            .storage
            .get_campaign(campaign_id)
            .await?
            .ok_or_else(|| LeadpilotError::not_found("campaign", campaign_id))?;
        if campaign.status == CampaignStatus::Completed {
            return Err(LeadpilotError::InvalidState(format!(
                "campaign {campaign_id} is completed"
            )));
        }
        Ok(campaign)
    }

    async fn populate_members(
        &self,
        campaign: &Campaign,
    ) -> Result<Vec<CampaignContact>, LeadpilotError> {
        let contact_ids = self.segments.resolve(&campaign.audience_filter).await?;
        let added = self
            .storage
            .insert_campaign_contacts(&campaign.id, &contact_ids)
            .await?;
        let members = self.storage.list_campaign_contacts(&campaign.id).await?;
        let count = i64::try_from(members.len()).unwrap_or(i64::MAX);
        self.storage
            .set_campaign_contact_count(&campaign.id, count)
            .await?;
        info!(
            campaign_id = %campaign.id,
            resolved = contact_ids.len(),
            added,
            "campaign audience resolved"
        );
        Ok(members)
    }

    async fn run(
        &self,
        campaign: &Campaign,
        total_contacts: usize,
        targets: Vec<&CampaignContact>,
        skipped_count: usize,
    ) -> Result<ActivationSummary, LeadpilotError> {
        let mut summary = ActivationSummary::new(&campaign.id, total_contacts);
        summary.skipped_count = skipped_count;

        for member in targets {
            match self.activate_member(campaign, &member.contact_id).await {
                Ok(MemberOutcome::Activated) => summary.activated_count += 1,
                Ok(MemberOutcome::Deferred { active_agent }) => {
                    summary.deferred.push(DeferredContact {
                        contact_id: member.contact_id.clone(),
                        active_agent,
                    });
                }
                Err(failure) => {
                    warn!(
                        campaign_id = %campaign.id,
                        contact_id = %member.contact_id,
                        error = %failure.raw_error,
                        "campaign member activation failed"
                    );
                    self.record_failure(campaign, member, &failure).await?;
                    summary.failures.push(ContactFailure {
                        contact_id: member.contact_id.clone(),
                        message: failure.message,
                    });
                }
            }
        }

        let engaged = self
            .storage
            .list_campaign_contacts(&campaign.id)
            .await?
            .iter()
            .filter(|m| m.status == MembershipStatus::Active)
            .count();
        let started_at = campaign.start_date.unwrap_or_else(Utc::now);
        self.storage
            .complete_campaign_activation(
                &campaign.id,
                started_at,
                i64::try_from(engaged).unwrap_or(i64::MAX),
            )
            .await?;
        self.orchestrator.release_idle_locks();

        info!(
            campaign_id = %campaign.id,
            activated = summary.activated_count,
            deferred = summary.deferred_count(),
            failed = summary.failed_count(),
            total = summary.total_contacts,
            engaged,
            "campaign activation finished"
        );
        Ok(summary)
    }

    /// Assigns the campaign agent, marks the membership active and generates
    /// the first message.
    ///
    /// When the new assignment does not become the active agent (help mode,
    /// or a customer-service campaign against a contact another agent is
    /// talking to) nothing is generated and the membership keeps its status.
    async fn activate_member(
        &self,
        campaign: &Campaign,
        contact_id: &str,
    ) -> Result<MemberOutcome, MemberFailure> {
        let outcome = self
            .orchestrator
            .assign(contact_id, campaign.agent_type)
            .await
            .map_err(|e| MemberFailure {
                message: match &e {
                    LeadpilotError::NotFound { .. } => "contact not found".to_string(),
                    _ => "agent assignment failed".to_string(),
                },
                raw_error: e.to_string(),
                message_type: MessageType::Introduction,
            })?;
        if !outcome.is_active() {
            let active_agent = outcome.active.as_ref().map(|a| a.agent_type);
            info!(
                campaign_id = %campaign.id,
                contact_id,
                agent_type = %campaign.agent_type,
                active = ?active_agent,
                "campaign member deferred, agent queued behind the active one"
            );
            return Ok(MemberOutcome::Deferred { active_agent });
        }
        let message_type = outcome.message_type;

        self.storage
            .mark_campaign_contact_active(
                &campaign.id,
                contact_id,
                &outcome.assignment.id,
                outcome.assignment.assigned_at,
            )
            .await
            .map_err(|e| MemberFailure {
                message: "failed to record membership".to_string(),
                raw_error: e.to_string(),
                message_type,
            })?;

        let request = GenerationRequest {
            contact_id: contact_id.to_string(),
            assignment_id: outcome.assignment.id.clone(),
            message_type,
            trigger: TriggerContext {
                campaign_id: Some(campaign.id.clone()),
                campaign_strategy: campaign.strategy.clone(),
                previous_agent_type: outcome.previous_agent_type,
            },
            channel: campaign.channel,
        };

        match tokio::time::timeout(self.generation_timeout, self.generator.generate(request)).await
        {
            Ok(Ok(_message)) => {
                debug!(
                    campaign_id = %campaign.id,
                    contact_id,
                    message_type = %message_type,
                    "campaign member activated"
                );
                Ok(MemberOutcome::Activated)
            }
            Ok(Err(e)) => Err(MemberFailure {
                message: "message generation failed".to_string(),
                raw_error: e.to_string(),
                message_type,
            }),
            Err(_elapsed) => {
                let timeout = LeadpilotError::Timeout {
                    duration: self.generation_timeout,
                };
                Err(MemberFailure {
                    message: "message generation timed out".to_string(),
                    raw_error: timeout.to_string(),
                    message_type,
                })
            }
        }
    }

    async fn record_failure(
        &self,
        campaign: &Campaign,
        member: &CampaignContact,
        failure: &MemberFailure,
    ) -> Result<(), LeadpilotError> {
        let contact_name = match self.storage.get_contact(&member.contact_id).await {
            Ok(contact) => contact.and_then(|c| c.name),
            Err(_) => None,
        };
        let retry_count = member
            .last_error
            .as_ref()
            .map_or(0, |previous| previous.retry_count + 1);
        let error = CampaignContactError {
            message: failure.message.clone(),
            raw_error: failure.raw_error.clone(),
            timestamp: Utc::now(),
            retry_count,
            message_type: failure.message_type,
            contact_name,
        };
        self.storage
            .mark_campaign_contact_failed(&campaign.id, &member.contact_id, &error)
            .await
    }
}
