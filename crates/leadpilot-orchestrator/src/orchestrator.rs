// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent assignment orchestration.
//!
//! [`AgentOrchestrator`] owns every mutation of a contact's assignments and
//! conversation state. Each operation takes the contact's lock, applies its
//! change, and finishes with a priority recalculation whose result is
//! written back in a single upsert.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use leadpilot_config::model::OrchestratorConfig;
use leadpilot_core::types::{
    AgentAssignment, AgentType, AssignmentSource, AssignmentStatus, AssignmentUpsert,
    ConversationState, MessageDirection, MessageType, QueuedAgent,
};
use leadpilot_core::{LeadpilotError, StorageAdapter};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::locks::ContactLocks;
use crate::priority::{Resolution, resolve_priority};

/// Result of creating or reactivating an assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentOutcome {
    pub assignment: AgentAssignment,
    /// `Handoff` when the new assignment took over from another non-CS
    /// agent, else `Introduction`.
    pub message_type: MessageType,
    pub previous_agent_type: Option<AgentType>,
    /// Active agent after recalculation. Not necessarily the new assignment.
    pub active: Option<AgentAssignment>,
}

impl AssignmentOutcome {
    pub fn is_handoff(&self) -> bool {
        self.message_type == MessageType::Handoff
    }

    /// Whether the new assignment is the contact's active agent after recalculation.
    pub fn is_active(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.id == self.assignment.id)
    }
}

/// Snapshot of a contact's agents, for status displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactAgents {
    pub state: ConversationState,
    pub assignments: Vec<AgentAssignment>,
    pub active: Option<AgentAssignment>,
    pub help_mode: bool,
}

pub struct AgentOrchestrator {
    storage: Arc<dyn StorageAdapter>,
    config: OrchestratorConfig,
    locks: ContactLocks,
}

impl AgentOrchestrator {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: OrchestratorConfig) -> Self {
        Self {
            storage,
            config,
            locks: ContactLocks::new(),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Drops per-contact lock entries that nobody holds. Batch callers run
    /// this once they are done with a set of contacts.
    pub fn release_idle_locks(&self) {
        self.locks.prune();
    }

    /// Number of per-contact lock entries currently kept.
    pub fn tracked_contacts(&self) -> usize {
        self.locks.len()
    }

    /// Creates or reactivates the `agent_type` assignment for a contact.
    ///
    /// When the contact's current active agent is of a different non-CS type
    /// the displaced agent is queued, and if the new assignment wins the
    /// recalculation the outcome asks for a handoff message. Check
    /// [`AssignmentOutcome::is_active`] before speaking: during help mode, or
    /// when a customer-service assignment is requested while another agent is
    /// active, the new assignment is only queued. Reactivating an existing
    /// assignment keeps its id and counters.
    #[instrument(skip(self))]
    pub async fn assign(
        &self,
        contact_id: &str,
        agent_type: AgentType,
    ) -> Result<AssignmentOutcome, LeadpilotError> {
        self.assign_with(contact_id, agent_type, AssignmentSource::Conversation, None)
            .await
    }

    /// Creates or reactivates a product-concierge agent bound to an owned product.
    ///
    /// A contact has one product-concierge row. Assigning it for another
    /// owned product rebinds that row to the new product and, like any
    /// reactivation, keeps its id and counters.
    #[instrument(skip(self))]
    pub async fn assign_product_agent(
        &self,
        contact_id: &str,
        product_id: &str,
    ) -> Result<AssignmentOutcome, LeadpilotError> {
        let contact = self
            .storage
            .get_contact(contact_id)
            .await?
            .ok_or_else(|| LeadpilotError::not_found("contact", contact_id))?;
        if !contact.products_owned.iter().any(|p| p == product_id) {
            return Err(LeadpilotError::InvalidState(format!(
                "contact {contact_id} does not own product {product_id}"
            )));
        }
        self.assign_with(
            contact_id,
            AgentType::ProductConcierge,
            AssignmentSource::ProductAgent,
            Some(product_id.to_string()),
        )
        .await
    }

    async fn assign_with(
        &self,
        contact_id: &str,
        agent_type: AgentType,
        source: AssignmentSource,
        product_id: Option<String>,
    ) -> Result<AssignmentOutcome, LeadpilotError> {
        let _guard = self.locks.lock(contact_id).await;
        self.require_contact(contact_id).await?;

        let now = Utc::now();
        let mut state = self.load_state(contact_id).await?;
        let assignments = self.storage.list_assignments(contact_id).await?;
        let current = resolve_priority(&assignments, &state, now).active;

        let displaced = current.filter(|active| {
            active.agent_type != agent_type && !active.agent_type.is_customer_service()
        });
        if let Some(active) = &displaced {
            state.enqueue(QueuedAgent {
                agent_id: active.id.clone(),
                agent_type: active.agent_type,
                queued_at: now,
            });
        }

        let assignment = self
            .storage
            .upsert_assignment(&AssignmentUpsert {
                contact_id: contact_id.to_string(),
                agent_type,
                source,
                product_id,
                expires_at: self.config.lifetime_for(agent_type).expires_at(now)?,
                assigned_at: now,
            })
            .await?;

        let resolution = self.recalculate_locked(state, now).await?;

        // A handoff only happened if the new assignment now holds the active slot.
        let took_over = resolution
            .active
            .as_ref()
            .is_some_and(|active| active.id == assignment.id);
        let previous_agent_type = displaced
            .filter(|previous| took_over && previous.id != assignment.id)
            .map(|previous| previous.agent_type);
        let message_type = match previous_agent_type {
            Some(previous) => {
                info!(
                    contact_id,
                    from = %previous,
                    to = %agent_type,
                    assignment_id = %assignment.id,
                    "agent handoff"
                );
                MessageType::Handoff
            }
            None => {
                debug!(
                    contact_id,
                    assignment_id = %assignment.id,
                    active = took_over,
                    "agent assigned"
                );
                MessageType::Introduction
            }
        };

        Ok(AssignmentOutcome {
            assignment,
            message_type,
            previous_agent_type,
            active: resolution.active,
        })
    }

    /// Recomputes and persists the active agent and queue as of now.
    pub async fn recalculate(&self, contact_id: &str) -> Result<ConversationState, LeadpilotError> {
        self.recalculate_at(contact_id, Utc::now()).await
    }

    /// Recomputes and persists the active agent and queue as of `now`.
    pub async fn recalculate_at(
        &self,
        contact_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ConversationState, LeadpilotError> {
        let _guard = self.locks.lock(contact_id).await;
        let state = self.load_state(contact_id).await?;
        let resolution = self.recalculate_locked(state.clone(), now).await?;
        let mut updated = state;
        resolution.apply(&mut updated);
        Ok(updated)
    }

    /// The agent allowed to speak to the contact right now, without persisting anything.
    pub async fn current_active(
        &self,
        contact_id: &str,
    ) -> Result<Option<AgentAssignment>, LeadpilotError> {
        self.current_active_at(contact_id, Utc::now()).await
    }

    pub async fn current_active_at(
        &self,
        contact_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AgentAssignment>, LeadpilotError> {
        let state = self.load_state(contact_id).await?;
        let assignments = self.storage.list_assignments(contact_id).await?;
        Ok(resolve_priority(&assignments, &state, now).active)
    }

    /// Assignments, state and the resolved active agent for a contact.
    pub async fn describe(&self, contact_id: &str) -> Result<ContactAgents, LeadpilotError> {
        self.require_contact(contact_id).await?;
        let now = Utc::now();
        let state = self.load_state(contact_id).await?;
        let assignments = self.storage.list_assignments(contact_id).await?;
        let active = resolve_priority(&assignments, &state, now).active;
        Ok(ContactAgents {
            help_mode: state.help_mode_active(now),
            state,
            assignments,
            active,
        })
    }

    /// Puts the contact in help mode for `duration`, or the configured default.
    ///
    /// Reactivates or creates the customer-service assignment so that it
    /// becomes the active agent for the whole window.
    #[instrument(skip(self))]
    pub async fn enter_help_mode(
        &self,
        contact_id: &str,
        duration: Option<Duration>,
    ) -> Result<ConversationState, LeadpilotError> {
        let _guard = self.locks.lock(contact_id).await;
        self.require_contact(contact_id).await?;

        let now = Utc::now();
        let duration =
            duration.unwrap_or_else(|| Duration::minutes(i64::from(self.config.help_mode_minutes)));
        let until = now + duration;

        let cs = self
            .storage
            .upsert_assignment(&AssignmentUpsert {
                contact_id: contact_id.to_string(),
                agent_type: AgentType::CustomerService,
                source: AssignmentSource::Conversation,
                product_id: None,
                expires_at: self
                    .config
                    .lifetime_for(AgentType::CustomerService)
                    .expires_at(now)?,
                assigned_at: now,
            })
            .await?;

        let mut state = self.load_state(contact_id).await?;
        state.help_mode_until = Some(until);
        let resolution = self.recalculate_locked(state.clone(), now).await?;
        resolution.apply(&mut state);

        info!(contact_id, assignment_id = %cs.id, until = %until, "help mode entered");
        Ok(state)
    }

    /// Clears help mode and lets the regular priority rule apply again.
    #[instrument(skip(self))]
    pub async fn exit_help_mode(
        &self,
        contact_id: &str,
    ) -> Result<ConversationState, LeadpilotError> {
        let _guard = self.locks.lock(contact_id).await;
        let now = Utc::now();
        let mut state = self.load_state(contact_id).await?;
        state.help_mode_until = None;
        let resolution = self.recalculate_locked(state.clone(), now).await?;
        resolution.apply(&mut state);
        info!(contact_id, "help mode cleared");
        Ok(state)
    }

    /// Changes an assignment's lifecycle status and recalculates its contact.
    #[instrument(skip(self))]
    pub async fn set_assignment_status(
        &self,
        assignment_id: &str,
        status: AssignmentStatus,
    ) -> Result<AgentAssignment, LeadpilotError> {
        let assignment = self.require_assignment(assignment_id).await?;
        let contact_id = assignment.contact_id.clone();

        let _guard = self.locks.lock(&contact_id).await;
        self.storage
            .set_assignment_status(assignment_id, status)
            .await?;
        let state = self.load_state(&contact_id).await?;
        self.recalculate_locked(state, Utc::now()).await?;

        info!(
            contact_id = %contact_id,
            agent_type = %assignment.agent_type,
            from = %assignment.status,
            to = %status,
            "assignment status changed"
        );
        self.require_assignment(assignment_id).await
    }

    /// Bumps the assignment's outbound or inbound counter.
    ///
    /// Inbound messages also stamp the contact's last engagement time.
    pub async fn record_message(
        &self,
        assignment_id: &str,
        direction: MessageDirection,
    ) -> Result<AgentAssignment, LeadpilotError> {
        let assignment = self.require_assignment(assignment_id).await?;
        let contact_id = assignment.contact_id.clone();

        let _guard = self.locks.lock(&contact_id).await;
        self.storage
            .increment_assignment_counter(assignment_id, direction)
            .await?;
        if direction == MessageDirection::Inbound {
            let mut state = self.load_state(&contact_id).await?;
            state.last_engagement_at = Some(Utc::now());
            self.storage.save_conversation_state(&state).await?;
        }
        self.require_assignment(assignment_id).await
    }

    /// Marks past-due assignments expired and recalculates each affected contact.
    ///
    /// Expired rows are already ignored by the priority rule, so this only
    /// makes persisted statuses and queues catch up.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> Result<Vec<String>, LeadpilotError> {
        let contacts = self.storage.expire_assignments(now).await?;
        for contact_id in &contacts {
            let _guard = self.locks.lock(contact_id).await;
            let state = self.load_state(contact_id).await?;
            self.recalculate_locked(state, now).await?;
        }
        if !contacts.is_empty() {
            info!(count = contacts.len(), "expired stale assignments");
        }
        self.release_idle_locks();
        Ok(contacts)
    }

    /// Caller must hold the contact's lock.
    async fn recalculate_locked(
        &self,
        mut state: ConversationState,
        now: DateTime<Utc>,
    ) -> Result<Resolution, LeadpilotError> {
        let assignments = self.storage.list_assignments(&state.contact_id).await?;
        let resolution = resolve_priority(&assignments, &state, now);
        resolution.apply(&mut state);
        state.updated_at = Some(now);
        self.storage.save_conversation_state(&state).await?;
        debug!(
            contact_id = %state.contact_id,
            active = ?resolution.active_id(),
            queued = resolution.queue.len(),
            "priority recalculated"
        );
        Ok(resolution)
    }

    async fn load_state(&self, contact_id: &str) -> Result<ConversationState, LeadpilotError> {
        Ok(self
            .storage
            .get_conversation_state(contact_id)
            .await?
            .unwrap_or_else(|| ConversationState::new(contact_id)))
    }

    async fn require_contact(&self, contact_id: &str) -> Result<(), LeadpilotError> {
        match self.storage.get_contact(contact_id).await? {
            Some(_) => Ok(()),
            None => Err(LeadpilotError::not_found("contact", contact_id)),
        }
    }

    async fn require_assignment(
        &self,
        assignment_id: &str,
    ) -> Result<AgentAssignment, LeadpilotError> {
        self.storage
            .get_assignment(assignment_id)
            .await?
            .ok_or_else(|| LeadpilotError::not_found("assignment", assignment_id))
    }
}
