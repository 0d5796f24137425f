// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full engine on a temp SQLite database with
//! mock external services: scoring engine, orchestrator, campaign activator
//! and score queue all share the same storage.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use leadpilot_campaign::CampaignActivator;
use leadpilot_config::model::{LeadpilotConfig, StorageConfig};
use leadpilot_core::types::{
    AgentType, AudienceFilter, Campaign, CampaignStatus, Channel, Contact, ContactMessage,
    EngagementEvent, EngagementEventKind, MessageDirection,
};
use leadpilot_core::{IntentClassifierAdapter, LeadpilotError, StorageAdapter};
use leadpilot_orchestrator::AgentOrchestrator;
use leadpilot_scoring::{LeadScoringEngine, ScoreQueue};
use leadpilot_storage::SqliteStorage;

use crate::mock_classifier::MockIntentClassifier;
use crate::mock_generator::MockMessageGenerator;
use crate::mock_segments::StaticSegmentResolver;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    config: LeadpilotConfig,
    with_classifier: bool,
    segment_contacts: Vec<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            config: LeadpilotConfig::default(),
            with_classifier: true,
            segment_contacts: Vec::new(),
        }
    }

    /// Adjust the configuration before the engine is assembled.
    pub fn with_config(mut self, adjust: impl FnOnce(&mut LeadpilotConfig)) -> Self {
        adjust(&mut self.config);
        self
    }

    /// Build the scoring engine without a classifier.
    pub fn without_classifier(mut self) -> Self {
        self.with_classifier = false;
        self
    }

    /// Contact ids returned by the static segment resolver.
    pub fn with_segment_contacts(mut self, ids: &[&str]) -> Self {
        self.segment_contacts = ids.iter().map(|id| id.to_string()).collect();
        self
    }

    pub async fn build(self) -> Result<TestHarness, LeadpilotError> {
        let temp_dir = tempfile::TempDir::new().map_err(LeadpilotError::storage)?;
        let db_path = temp_dir.path().join("test.db");

        let mut config = self.config;
        config.storage = StorageConfig {
            database_path: db_path.to_string_lossy().to_string(),
            wal_mode: true,
        };

        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;
        let storage_dyn: Arc<dyn StorageAdapter> = storage.clone();

        let classifier = Arc::new(MockIntentClassifier::new());
        let classifier_dyn: Option<Arc<dyn IntentClassifierAdapter>> = if self.with_classifier {
            Some(classifier.clone() as Arc<dyn IntentClassifierAdapter>)
        } else {
            None
        };
        let generator = Arc::new(MockMessageGenerator::new());
        let segments = Arc::new(StaticSegmentResolver::new(self.segment_contacts));

        let engine = Arc::new(LeadScoringEngine::new(
            storage_dyn.clone(),
            classifier_dyn,
            config.scoring.clone(),
        ));
        let orchestrator = Arc::new(AgentOrchestrator::new(
            storage_dyn.clone(),
            config.orchestrator.clone(),
        ));
        let activator = Arc::new(CampaignActivator::new(
            storage_dyn.clone(),
            orchestrator.clone(),
            generator.clone(),
            segments.clone(),
            &config.campaign,
        ));
        let score_queue = Arc::new(ScoreQueue::new(
            storage_dyn.clone(),
            engine.clone(),
            &config.scoring,
        ));

        Ok(TestHarness {
            storage,
            storage_dyn,
            classifier,
            generator,
            segments,
            engine,
            orchestrator,
            activator,
            score_queue,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// SQLite storage (temp DB, cleaned up on drop).
    pub storage: Arc<SqliteStorage>,
    /// The same storage behind the trait object the services use.
    pub storage_dyn: Arc<dyn StorageAdapter>,
    pub classifier: Arc<MockIntentClassifier>,
    pub generator: Arc<MockMessageGenerator>,
    pub segments: Arc<StaticSegmentResolver>,
    pub engine: Arc<LeadScoringEngine>,
    pub orchestrator: Arc<AgentOrchestrator>,
    pub activator: Arc<CampaignActivator>,
    pub score_queue: Arc<ScoreQueue>,
    pub config: LeadpilotConfig,
    /// Temp directory kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    /// Create a new builder for configuring the test harness.
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with default configuration.
    pub async fn new() -> Result<Self, LeadpilotError> {
        Self::builder().build().await
    }

    /// Stores a contact and returns it.
    pub async fn add_contact(&self, contact: Contact) -> Result<Contact, LeadpilotError> {
        self.storage.upsert_contact(&contact).await?;
        Ok(contact)
    }

    /// Stores a bare contact with the given id.
    pub async fn add_plain_contact(&self, id: &str) -> Result<Contact, LeadpilotError> {
        self.add_contact(Contact::new(id)).await
    }

    pub async fn contact(&self, id: &str) -> Result<Contact, LeadpilotError> {
        self.storage
            .get_contact(id)
            .await?
            .ok_or_else(|| LeadpilotError::not_found("contact", id))
    }

    /// Records an SMS from or to the contact.
    pub async fn add_sms(
        &self,
        contact_id: &str,
        direction: MessageDirection,
        body: &str,
        at: DateTime<Utc>,
    ) -> Result<(), LeadpilotError> {
        self.storage
            .insert_message(&ContactMessage {
                id: uuid::Uuid::new_v4().to_string(),
                contact_id: contact_id.to_string(),
                channel: Channel::Sms,
                direction,
                body: body.to_string(),
                created_at: at,
            })
            .await
    }

    pub async fn add_event(
        &self,
        contact_id: &str,
        kind: EngagementEventKind,
    ) -> Result<(), LeadpilotError> {
        self.storage
            .record_engagement_event(&EngagementEvent {
                id: uuid::Uuid::new_v4().to_string(),
                contact_id: contact_id.to_string(),
                kind,
                occurred_at: Utc::now(),
            })
            .await
    }

    /// Creates a draft SMS campaign for `agent_type`.
    ///
    /// With `members` the memberships are inserted directly; with `None` the
    /// activator resolves them through the segment resolver.
    pub async fn add_campaign(
        &self,
        id: &str,
        agent_type: AgentType,
        members: Option<&[&str]>,
    ) -> Result<Campaign, LeadpilotError> {
        let campaign = Campaign {
            id: id.to_string(),
            name: format!("{id} campaign"),
            agent_type,
            strategy: Some("test strategy".to_string()),
            audience_filter: AudienceFilter::default(),
            channel: Channel::Sms,
            status: CampaignStatus::Draft,
            start_date: None,
            contact_count: 0,
            engaged_count: 0,
            created_at: Utc::now(),
        };
        self.storage.create_campaign(&campaign).await?;
        if let Some(members) = members {
            let ids: Vec<String> = members.iter().map(|m| m.to_string()).collect();
            let added = self.storage.insert_campaign_contacts(id, &ids).await?;
            self.storage
                .set_campaign_contact_count(id, i64::try_from(added).unwrap_or(i64::MAX))
                .await?;
        }
        Ok(campaign)
    }
}
