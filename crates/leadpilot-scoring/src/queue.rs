// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Background score queue on top of the crash-safe storage queue.
//!
//! Jobs survive restarts: an entry claimed by a worker that dies is reclaimed
//! once its lock lapses. Failed jobs are retried until `job_max_attempts`.

use std::sync::Arc;
use std::time::Duration;

use leadpilot_config::model::ScoringConfig;
use leadpilot_core::types::{LeadStatus, QueueFailure};
use leadpilot_core::{LeadpilotError, StorageAdapter};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::engine::LeadScoringEngine;

/// Queue name used for scoring jobs.
pub const SCORE_QUEUE: &str = "lead_scoring";

/// Payload of a scoring job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreJob {
    pub contact_id: String,
}

/// Outcome of processing one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScoreJobReport {
    Completed {
        job_id: i64,
        contact_id: String,
        score: i32,
        status: LeadStatus,
    },
    Failed {
        job_id: i64,
        contact_id: Option<String>,
        error: String,
        attempts: i32,
        /// No attempts left; the entry stays in `failed`.
        exhausted: bool,
    },
}

impl ScoreJobReport {
    pub fn is_completed(&self) -> bool {
        matches!(self, ScoreJobReport::Completed { .. })
    }
}

/// Submits and drains scoring jobs.
pub struct ScoreQueue {
    storage: Arc<dyn StorageAdapter>,
    engine: Arc<LeadScoringEngine>,
    max_attempts: i32,
    poll_interval: Duration,
}

impl ScoreQueue {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        engine: Arc<LeadScoringEngine>,
        config: &ScoringConfig,
    ) -> Self {
        Self {
            storage,
            engine,
            max_attempts: config.job_max_attempts,
            poll_interval: Duration::from_secs(config.worker_poll_interval_secs),
        }
    }

    /// Enqueues a scoring job for the contact. Returns the queue entry id.
    pub async fn submit(&self, contact_id: &str) -> Result<i64, LeadpilotError> {
        let payload = serde_json::to_string(&ScoreJob {
            contact_id: contact_id.to_string(),
        })
        .map_err(|e| LeadpilotError::Internal(format!("score job serialization: {e}")))?;
        let id = self
            .storage
            .enqueue(SCORE_QUEUE, &payload, self.max_attempts)
            .await?;
        debug!(job_id = id, contact_id, "score job submitted");
        Ok(id)
    }

    /// Claims and processes one job. Returns `None` when the queue is empty.
    ///
    /// Only queue bookkeeping errors are returned as `Err`. A failing score
    /// computation is reported through [`ScoreJobReport::Failed`].
    pub async fn run_once(&self) -> Result<Option<ScoreJobReport>, LeadpilotError> {
        let Some(entry) = self.storage.dequeue(SCORE_QUEUE).await? else {
            return Ok(None);
        };

        let job: ScoreJob = match serde_json::from_str(&entry.payload) {
            Ok(job) => job,
            Err(e) => {
                let error = format!("malformed score job payload: {e}");
                return self.report_failure(entry.id, None, error).await.map(Some);
            }
        };

        match self.engine.score_contact(&job.contact_id).await {
            Ok(score) => {
                self.storage.ack(entry.id).await?;
                Ok(Some(ScoreJobReport::Completed {
                    job_id: entry.id,
                    contact_id: job.contact_id,
                    score: score.score,
                    status: score.status,
                }))
            }
            Err(e) => self
                .report_failure(entry.id, Some(job.contact_id), e.to_string())
                .await
                .map(Some),
        }
    }

    async fn report_failure(
        &self,
        job_id: i64,
        contact_id: Option<String>,
        error: String,
    ) -> Result<ScoreJobReport, LeadpilotError> {
        let (attempts, exhausted) = match self.storage.fail(job_id).await? {
            QueueFailure::Retrying { attempts } => (attempts, false),
            QueueFailure::Exhausted { attempts } => (attempts, true),
        };
        if exhausted {
            error!(job_id, contact_id = ?contact_id, attempts, error = %error, "score job exhausted");
        } else {
            warn!(job_id, contact_id = ?contact_id, attempts, error = %error, "score job failed, will retry");
        }
        Ok(ScoreJobReport::Failed {
            job_id,
            contact_id,
            error,
            attempts,
            exhausted,
        })
    }

    /// Drains every pending job and returns the reports in processing order.
    pub async fn drain(&self) -> Result<Vec<ScoreJobReport>, LeadpilotError> {
        let mut reports = Vec::new();
        while let Some(report) = self.run_once().await? {
            reports.push(report);
        }
        Ok(reports)
    }

    /// Processes jobs until `cancel` fires, sleeping between empty polls.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "score worker started"
        );
        loop {
            let idle = match self.run_once().await {
                Ok(Some(_)) => false,
                Ok(None) => true,
                Err(e) => {
                    error!(error = %e, "score queue error");
                    true
                }
            };
            if !idle {
                if cancel.is_cancelled() {
                    break;
                }
                continue;
            }
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = cancel.cancelled() => break,
            }
        }
        info!("score worker stopped");
    }
}
