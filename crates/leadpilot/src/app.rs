// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wiring of the storage, scoring, orchestration and campaign services.

use std::sync::Arc;

use leadpilot_campaign::CampaignActivator;
use leadpilot_config::LeadpilotConfig;
use leadpilot_core::{IntentClassifierAdapter, LeadpilotError, StorageAdapter};
use leadpilot_llm::{HttpIntentClassifier, HttpMessageGenerator};
use leadpilot_orchestrator::AgentOrchestrator;
use leadpilot_scoring::{LeadScoringEngine, ScoreQueue};
use leadpilot_storage::{SqliteSegmentResolver, SqliteStorage};
use tracing::{debug, info};

/// Every service a CLI command may need, sharing one database handle.
pub struct Services {
    pub config: LeadpilotConfig,
    pub storage: Arc<SqliteStorage>,
    pub engine: Arc<LeadScoringEngine>,
    pub orchestrator: Arc<AgentOrchestrator>,
    pub score_queue: ScoreQueue,
    segments: Arc<SqliteSegmentResolver>,
}

impl Services {
    /// Opens the database and builds the services.
    ///
    /// The classifier is optional. Without an endpoint scoring runs on neutral intent.
    pub async fn open(config: LeadpilotConfig) -> Result<Self, LeadpilotError> {
        let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
        storage.initialize().await?;
        let storage_dyn: Arc<dyn StorageAdapter> = storage.clone();

        let classifier = match config.classifier.endpoint {
            Some(_) => Some(
                Arc::new(HttpIntentClassifier::new(&config.classifier)?)
                    as Arc<dyn IntentClassifierAdapter>,
            ),
            None => {
                info!("classifier.endpoint not set, scoring with neutral intent");
                None
            }
        };

        let engine = Arc::new(LeadScoringEngine::new(
            storage_dyn.clone(),
            classifier,
            config.scoring.clone(),
        ));
        let orchestrator = Arc::new(AgentOrchestrator::new(
            storage_dyn.clone(),
            config.orchestrator.clone(),
        ));
        let score_queue = ScoreQueue::new(storage_dyn, engine.clone(), &config.scoring);
        let segments = Arc::new(SqliteSegmentResolver::new(storage.database()?.clone()));

        debug!(database = %config.storage.database_path, "services ready");
        Ok(Self {
            config,
            storage,
            engine,
            orchestrator,
            score_queue,
            segments,
        })
    }

    /// Builds the campaign activator. Requires a configured generator endpoint.
    pub fn activator(&self) -> Result<CampaignActivator, LeadpilotError> {
        let generator = Arc::new(HttpMessageGenerator::new(&self.config.generator)?);
        Ok(CampaignActivator::new(
            self.storage.clone(),
            self.orchestrator.clone(),
            generator,
            self.segments.clone(),
            &self.config.campaign,
        ))
    }

    /// Flushes and closes the database.
    pub async fn close(&self) -> Result<(), LeadpilotError> {
        self.storage.close().await
    }
}
