// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::OnceCell;
use tracing::debug;

use leadpilot_config::model::StorageConfig;
use leadpilot_core::types::{
    AgentAssignment, AssignmentStatus, AssignmentUpsert, Campaign, CampaignContact,
    CampaignContactError, Contact, ContactMessage, ConversationState, EngagementEvent,
    EngagementSignals, LeadScoreUpdate, MessageDirection, QueueEntry, QueueFailure, ScoreRecord,
};
use leadpilot_core::{AdapterType, HealthStatus, LeadpilotError, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates all query operations to the
/// typed query modules. The database is opened on the first call to
/// [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a new SqliteStorage with the given configuration.
    ///
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// The underlying database, for components that share the connection.
    pub fn database(&self) -> Result<&Database, LeadpilotError> {
        self.db()
    }

    fn db(&self) -> Result<&Database, LeadpilotError> {
        self.db.get().ok_or_else(|| LeadpilotError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadpilotError> {
        let db = match self.db.get() {
            Some(db) => db,
            None => return Ok(HealthStatus::Unhealthy("not initialized".to_string())),
        };
        db.connection()
            .call(|conn| -> rusqlite::Result<()> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadpilotError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), LeadpilotError> {
        let path = self.config.database_path.clone();
        let db = Database::open_with(&path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| LeadpilotError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), LeadpilotError> {
        self.db()?.close().await?;
        debug!("storage closed");
        Ok(())
    }

    // --- Contacts ---

    async fn upsert_contact(&self, contact: &Contact) -> Result<(), LeadpilotError> {
        queries::contacts::upsert_contact(self.db()?, contact).await
    }

    async fn get_contact(&self, id: &str) -> Result<Option<Contact>, LeadpilotError> {
        queries::contacts::get_contact(self.db()?, id).await
    }

    async fn record_lead_score(
        &self,
        update: &LeadScoreUpdate,
        record: &ScoreRecord,
    ) -> Result<(), LeadpilotError> {
        queries::scores::record_lead_score(self.db()?, update, record).await
    }

    async fn list_score_records(
        &self,
        contact_id: &str,
        limit: i64,
    ) -> Result<Vec<ScoreRecord>, LeadpilotError> {
        queries::scores::list_score_records(self.db()?, contact_id, limit).await
    }

    // --- Messages and engagement ---

    async fn insert_message(&self, message: &ContactMessage) -> Result<(), LeadpilotError> {
        queries::messages::insert_message(self.db()?, message).await
    }

    async fn recent_messages(
        &self,
        contact_id: &str,
        limit: i64,
    ) -> Result<Vec<ContactMessage>, LeadpilotError> {
        queries::messages::recent_messages(self.db()?, contact_id, limit).await
    }

    async fn record_engagement_event(
        &self,
        event: &EngagementEvent,
    ) -> Result<(), LeadpilotError> {
        queries::messages::record_engagement_event(self.db()?, event).await
    }

    async fn engagement_signals(
        &self,
        contact_id: &str,
    ) -> Result<EngagementSignals, LeadpilotError> {
        queries::messages::engagement_signals(self.db()?, contact_id).await
    }

    // --- Agent assignments ---

    async fn list_assignments(
        &self,
        contact_id: &str,
    ) -> Result<Vec<AgentAssignment>, LeadpilotError> {
        queries::assignments::list_assignments(self.db()?, contact_id).await
    }

    async fn get_assignment(&self, id: &str) -> Result<Option<AgentAssignment>, LeadpilotError> {
        queries::assignments::get_assignment(self.db()?, id).await
    }

    async fn upsert_assignment(
        &self,
        upsert: &AssignmentUpsert,
    ) -> Result<AgentAssignment, LeadpilotError> {
        queries::assignments::upsert_assignment(self.db()?, upsert).await
    }

    async fn set_assignment_status(
        &self,
        id: &str,
        status: AssignmentStatus,
    ) -> Result<(), LeadpilotError> {
        queries::assignments::set_assignment_status(self.db()?, id, status).await
    }

    async fn increment_assignment_counter(
        &self,
        id: &str,
        direction: MessageDirection,
    ) -> Result<(), LeadpilotError> {
        queries::assignments::increment_assignment_counter(self.db()?, id, direction).await
    }

    async fn expire_assignments(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<String>, LeadpilotError> {
        queries::assignments::expire_assignments(self.db()?, now).await
    }

    // --- Conversation state ---

    async fn get_conversation_state(
        &self,
        contact_id: &str,
    ) -> Result<Option<ConversationState>, LeadpilotError> {
        queries::conversation_state::get_conversation_state(self.db()?, contact_id).await
    }

    async fn save_conversation_state(
        &self,
        state: &ConversationState,
    ) -> Result<(), LeadpilotError> {
        queries::conversation_state::save_conversation_state(self.db()?, state).await
    }

    // --- Campaigns ---

    async fn create_campaign(&self, campaign: &Campaign) -> Result<(), LeadpilotError> {
        queries::campaigns::create_campaign(self.db()?, campaign).await
    }

    async fn get_campaign(&self, id: &str) -> Result<Option<Campaign>, LeadpilotError> {
        queries::campaigns::get_campaign(self.db()?, id).await
    }

    async fn list_campaign_contacts(
        &self,
        campaign_id: &str,
    ) -> Result<Vec<CampaignContact>, LeadpilotError> {
        queries::campaigns::list_campaign_contacts(self.db()?, campaign_id).await
    }

    async fn insert_campaign_contacts(
        &self,
        campaign_id: &str,
        contact_ids: &[String],
    ) -> Result<usize, LeadpilotError> {
        queries::campaigns::insert_campaign_contacts(self.db()?, campaign_id, contact_ids).await
    }

    async fn set_campaign_contact_count(
        &self,
        campaign_id: &str,
        count: i64,
    ) -> Result<(), LeadpilotError> {
        queries::campaigns::set_campaign_contact_count(self.db()?, campaign_id, count).await
    }

    async fn mark_campaign_contact_active(
        &self,
        campaign_id: &str,
        contact_id: &str,
        assignment_id: &str,
        assigned_at: DateTime<Utc>,
    ) -> Result<(), LeadpilotError> {
        queries::campaigns::mark_campaign_contact_active(
            self.db()?,
            campaign_id,
            contact_id,
            assignment_id,
            assigned_at,
        )
        .await
    }

    async fn mark_campaign_contact_failed(
        &self,
        campaign_id: &str,
        contact_id: &str,
        error: &CampaignContactError,
    ) -> Result<(), LeadpilotError> {
        queries::campaigns::mark_campaign_contact_failed(self.db()?, campaign_id, contact_id, error)
            .await
    }

    async fn complete_campaign_activation(
        &self,
        campaign_id: &str,
        started_at: DateTime<Utc>,
        engaged_count: i64,
    ) -> Result<(), LeadpilotError> {
        queries::campaigns::complete_campaign_activation(
            self.db()?,
            campaign_id,
            started_at,
            engaged_count,
        )
        .await
    }

    // --- Queue ---

    async fn enqueue(
        &self,
        queue_name: &str,
        payload: &str,
        max_attempts: i32,
    ) -> Result<i64, LeadpilotError> {
        queries::queue::enqueue(self.db()?, queue_name, payload, max_attempts).await
    }

    async fn dequeue(&self, queue_name: &str) -> Result<Option<QueueEntry>, LeadpilotError> {
        queries::queue::dequeue(self.db()?, queue_name).await
    }

    async fn ack(&self, id: i64) -> Result<(), LeadpilotError> {
        queries::queue::ack(self.db()?, id).await
    }

    async fn fail(&self, id: i64) -> Result<QueueFailure, LeadpilotError> {
        queries::queue::fail(self.db()?, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leadpilot_core::types::{AgentType, AssignmentSource};
    use tempfile::tempdir;

    fn make_config(path: &str) -> StorageConfig {
        StorageConfig {
            database_path: path.to_string(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn sqlite_storage_implements_plugin_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert_eq!(storage.name(), "sqlite");
        assert_eq!(storage.version(), semver::Version::new(0, 1, 0));
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
    }

    #[tokio::test]
    async fn initialize_opens_database_at_configured_path() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("init_test.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(db_path.exists(), "database file should be created");
    }

    #[tokio::test]
    async fn initialize_twice_returns_error() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("double_init.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn health_check_reflects_initialization() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("health.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));

        assert!(matches!(
            storage.health_check().await.unwrap(),
            HealthStatus::Unhealthy(_)
        ));
        storage.initialize().await.unwrap();
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn operations_before_initialize_fail() {
        let storage = SqliteStorage::new(make_config("/unused/never-opened.db"));
        let err = storage.get_contact("c-1").await.unwrap_err();
        assert!(err.to_string().contains("not initialized"));
    }

    #[tokio::test]
    async fn contact_assignment_and_state_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("adapter.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        storage.upsert_contact(&Contact::new("c-1")).await.unwrap();
        let now = Utc::now();
        let assignment = storage
            .upsert_assignment(&AssignmentUpsert {
                contact_id: "c-1".to_string(),
                agent_type: AgentType::Onboarding,
                source: AssignmentSource::Conversation,
                product_id: None,
                expires_at: AgentType::Onboarding
                    .default_lifetime()
                    .expires_at(now)
                    .unwrap(),
                assigned_at: now,
            })
            .await
            .unwrap();

        let mut state = ConversationState::new("c-1");
        state.active_agent_id = Some(assignment.id.clone());
        storage.save_conversation_state(&state).await.unwrap();

        let fetched = storage.get_conversation_state("c-1").await.unwrap().unwrap();
        assert_eq!(fetched.active_agent_id.as_deref(), Some(assignment.id.as_str()));
        assert_eq!(storage.list_assignments("c-1").await.unwrap().len(), 1);

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn queue_operations_through_adapter() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("queue_adapter.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();

        let id = storage
            .enqueue("score", r#"{"contact_id":"c-1"}"#, 3)
            .await
            .unwrap();
        assert!(id > 0);

        let entry = storage.dequeue("score").await.unwrap().unwrap();
        assert_eq!(entry.status, "processing");
        storage.ack(entry.id).await.unwrap();

        storage.close().await.unwrap();
    }

    #[tokio::test]
    async fn shutdown_runs_checkpoint() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("shutdown.db");
        let storage = SqliteStorage::new(make_config(db_path.to_str().unwrap()));
        storage.initialize().await.unwrap();
        storage.upsert_contact(&Contact::new("c-1")).await.unwrap();
        storage.shutdown().await.unwrap();
    }
}
