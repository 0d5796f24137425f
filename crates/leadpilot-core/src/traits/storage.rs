// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::LeadpilotError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    AgentAssignment, AssignmentStatus, AssignmentUpsert, Campaign, CampaignContact,
    CampaignContactError, Contact, ContactMessage, ConversationState, EngagementEvent,
    EngagementSignals, LeadScoreUpdate, MessageDirection, QueueEntry, QueueFailure,
    ScoreRecord,
};

/// Adapter for storage and persistence backends.
///
/// Storage adapters own contacts, agent assignments, per-contact conversation
/// state, campaign membership, and the background work queue. Read-modify-write
/// sequences on one contact are serialized by the orchestrator, so every method
/// here only needs to be atomic on its own.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), LeadpilotError>;

    /// Closes the storage backend, flushing pending writes and releasing connections.
    async fn close(&self) -> Result<(), LeadpilotError>;

    // --- Contacts ---

    /// Inserts a contact or replaces every stored field of an existing one.
    async fn upsert_contact(&self, contact: &Contact) -> Result<(), LeadpilotError>;

    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, LeadpilotError>;

    /// Overwrites the cached score fields on `record.contact_id` and appends
    /// `record` to its score history. Either both land or neither does.
    async fn record_lead_score(
        &self,
        update: &LeadScoreUpdate,
        record: &ScoreRecord,
    ) -> Result<(), LeadpilotError>;

    /// Most recent score records first.
    async fn list_score_records(
        &self,
        contact_id: &str,
        limit: i64,
    ) -> Result<Vec<ScoreRecord>, LeadpilotError>;

    // --- Messages and engagement ---

    async fn insert_message(&self, message: &ContactMessage) -> Result<(), LeadpilotError>;

    /// Up to `limit` messages for the contact, newest first.
    async fn recent_messages(
        &self,
        contact_id: &str,
        limit: i64,
    ) -> Result<Vec<ContactMessage>, LeadpilotError>;

    async fn record_engagement_event(
        &self,
        event: &EngagementEvent,
    ) -> Result<(), LeadpilotError>;

    async fn engagement_signals(
        &self,
        contact_id: &str,
    ) -> Result<EngagementSignals, LeadpilotError>;

    // --- Agent assignments ---

    /// Every assignment row of both record kinds for a contact.
    async fn list_assignments(
        &self,
        contact_id: &str,
    ) -> Result<Vec<AgentAssignment>, LeadpilotError>;

    async fn get_assignment(&self, id: &str) -> Result<Option<AgentAssignment>, LeadpilotError>;

    /// Creates or reactivates the row for (contact, agent type) and returns it.
    async fn upsert_assignment(
        &self,
        upsert: &AssignmentUpsert,
    ) -> Result<AgentAssignment, LeadpilotError>;

    async fn set_assignment_status(
        &self,
        id: &str,
        status: AssignmentStatus,
    ) -> Result<(), LeadpilotError>;

    /// Bumps `messages_sent` (outbound) or `replies_received` (inbound).
    async fn increment_assignment_counter(
        &self,
        id: &str,
        direction: MessageDirection,
    ) -> Result<(), LeadpilotError>;

    /// Writes `expired` on active rows past their expiration. Returns the affected contact ids.
    async fn expire_assignments(&self, now: DateTime<Utc>)
    -> Result<Vec<String>, LeadpilotError>;

    // --- Conversation state ---

    async fn get_conversation_state(
        &self,
        contact_id: &str,
    ) -> Result<Option<ConversationState>, LeadpilotError>;

    /// Upserts the whole state row in a single statement.
    async fn save_conversation_state(
        &self,
        state: &ConversationState,
    ) -> Result<(), LeadpilotError>;

    // --- Campaigns ---

    async fn create_campaign(&self, campaign: &Campaign) -> Result<(), LeadpilotError>;

    async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, LeadpilotError>;

    /// Memberships in insertion order.
    async fn list_campaign_contacts(
        &self,
        campaign_id: &str,
    ) -> Result<Vec<CampaignContact>, LeadpilotError>;

    /// Inserts pending memberships, ignoring contacts already present. Returns rows added.
    async fn insert_campaign_contacts(
        &self,
        campaign_id: &str,
        contact_ids: &[String],
    ) -> Result<usize, LeadpilotError>;

    async fn set_campaign_contact_count(
        &self,
        campaign_id: &str,
        count: i64,
    ) -> Result<(), LeadpilotError>;

    /// Marks a membership active, links the assignment, and clears any prior error.
    async fn mark_campaign_contact_active(
        &self,
        campaign_id: &str,
        contact_id: &str,
        assignment_id: &str,
        assigned_at: DateTime<Utc>,
    ) -> Result<(), LeadpilotError>;

    async fn mark_campaign_contact_failed(
        &self,
        campaign_id: &str,
        contact_id: &str,
        error: &CampaignContactError,
    ) -> Result<(), LeadpilotError>;

    /// Sets the campaign active with its start date and engaged count.
    async fn complete_campaign_activation(
        &self,
        campaign_id: &str,
        started_at: DateTime<Utc>,
        engaged_count: i64,
    ) -> Result<(), LeadpilotError>;

    // --- Queue ---

    /// Enqueues a payload on the named queue. Returns the entry id.
    async fn enqueue(
        &self,
        queue_name: &str,
        payload: &str,
        max_attempts: i32,
    ) -> Result<i64, LeadpilotError>;

    /// Claims the oldest pending entry, or `None` if the queue is empty.
    async fn dequeue(&self, queue_name: &str) -> Result<Option<QueueEntry>, LeadpilotError>;

    /// Marks an entry completed.
    async fn ack(&self, id: i64) -> Result<(), LeadpilotError>;

    /// Records a failed attempt, returning whether the entry will be retried.
    async fn fail(&self, id: i64) -> Result<QueueFailure, LeadpilotError>;
}
