// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The unified lead scoring engine.
//!
//! [`compute_score`] is the pure formula. [`LeadScoringEngine`] wraps it with
//! the data fetches, the classifier call and persistence of the result.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use leadpilot_config::model::ScoringConfig;
use leadpilot_core::types::{
    Contact, EngagementSignals, IntentAnalysis, IntentContext, IntentLevel, IntentRequest,
    LeadScoreUpdate, LeadStatus, LikelihoodCategory, ScoreRecord,
};
use leadpilot_core::{IntentClassifierAdapter, LeadpilotError, StorageAdapter};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::components::{
    self, ActivityEngagement, MessageIntelligence, NegativeSignals, PurchaseHistory,
    PurchaseRecency, TimeDecay,
};

/// Base score for intent levels that bypass the weighted formula.
fn override_base(level: IntentLevel) -> Option<i32> {
    match level {
        IntentLevel::Immediate => Some(95),
        IntentLevel::Strong => Some(92),
        IntentLevel::Moderate => Some(87),
        IntentLevel::Low | IntentLevel::None => None,
    }
}

/// Full audit trail of one score computation. Persisted as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub intent: IntentAnalysis,
    /// True when the classifier failed and the neutral default was used.
    pub intent_fallback: bool,
    /// Set when a high-confidence intent level short-circuited the formula.
    pub override_applied: Option<IntentLevel>,
    pub message_intelligence: MessageIntelligence,
    pub purchase_history: PurchaseHistory,
    pub activity_engagement: ActivityEngagement,
    pub time_decay: TimeDecay,
    pub purchase_recency: PurchaseRecency,
    pub negative: NegativeSignals,
    /// Score before negatives and clamping.
    pub raw_total: i32,
    pub final_score: i32,
}

/// Output of [`compute_score`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub score: i32,
    pub status: LeadStatus,
    pub category: LikelihoodCategory,
    pub breakdown: ScoreBreakdown,
}

/// Computes the score for a contact from already-fetched inputs.
pub fn compute_score(
    contact: &Contact,
    signals: &EngagementSignals,
    intent: &IntentAnalysis,
    intent_fallback: bool,
    now: DateTime<Utc>,
) -> ScoreOutcome {
    let message_intelligence = components::message_intelligence(intent, signals);
    let purchase_history = components::purchase_history(contact);
    let activity_engagement = components::activity_engagement(signals);
    let time_decay = components::time_decay(contact, now);
    let purchase_recency = components::purchase_recency(contact, now);
    let negative = components::negative_signals(contact);

    let override_applied = override_base(intent.intent_level).map(|_| intent.intent_level);

    let (raw_total, score, status, category) = match override_base(intent.intent_level) {
        Some(base) => {
            let score = (base - negative.points).clamp(0, 100);
            let (status, category) = if score >= 80 {
                (LeadStatus::ReadyToBuy, LikelihoodCategory::Hot)
            } else if score >= 70 {
                (LeadStatus::Hot, LikelihoodCategory::Warm)
            } else {
                (LeadStatus::Warm, LikelihoodCategory::Warm)
            };
            (base, score, status, category)
        }
        None => {
            let raw = message_intelligence.total
                + purchase_history.total
                + activity_engagement.total
                + time_decay.points
                + purchase_recency.points;
            let score = (raw - negative.points).clamp(0, 100);
            let (status, category) = components::classify(score);
            (raw, score, status, category)
        }
    };

    ScoreOutcome {
        score,
        status,
        category,
        breakdown: ScoreBreakdown {
            intent: intent.clone(),
            intent_fallback,
            override_applied,
            message_intelligence,
            purchase_history,
            activity_engagement,
            time_decay,
            purchase_recency,
            negative,
            raw_total,
            final_score: score,
        },
    }
}

/// A persisted scoring result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadScore {
    pub contact_id: String,
    pub score: i32,
    pub status: LeadStatus,
    pub category: LikelihoodCategory,
    pub previous_status: Option<LeadStatus>,
    /// True when the status differs from the cached one.
    pub status_changed: bool,
    pub breakdown: ScoreBreakdown,
    pub scored_at: DateTime<Utc>,
}

/// Scores contacts and writes the cached score fields plus a history row.
pub struct LeadScoringEngine {
    storage: Arc<dyn StorageAdapter>,
    classifier: Option<Arc<dyn IntentClassifierAdapter>>,
    config: ScoringConfig,
}

impl LeadScoringEngine {
    /// Creates an engine. Without a classifier every contact gets neutral intent.
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        classifier: Option<Arc<dyn IntentClassifierAdapter>>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            storage,
            classifier,
            config,
        }
    }

    /// Scores a contact as of now.
    pub async fn score_contact(&self, contact_id: &str) -> Result<LeadScore, LeadpilotError> {
        self.score_contact_at(contact_id, Utc::now()).await
    }

    /// Scores a contact as of `now`.
    ///
    /// Fetch failures abort before anything is written. Classifier failures
    /// and timeouts fall back to neutral intent.
    pub async fn score_contact_at(
        &self,
        contact_id: &str,
        now: DateTime<Utc>,
    ) -> Result<LeadScore, LeadpilotError> {
        let contact = self
            .storage
            .get_contact(contact_id)
            .await?
            .ok_or_else(|| LeadpilotError::not_found("contact", contact_id))?;
        let limit = i64::try_from(self.config.recent_message_limit).unwrap_or(i64::MAX);
        let messages = self.storage.recent_messages(contact_id, limit).await?;
        let signals = self.storage.engagement_signals(contact_id).await?;

        let request = IntentRequest {
            contact_id: contact.id.clone(),
            messages,
            context: IntentContext {
                total_spent: contact.total_spent,
                products_owned: contact.products_owned.clone(),
                tier: contact.customer_tier.clone(),
            },
        };
        let (intent, fallback) = self.analyze_intent(request).await;

        let outcome = compute_score(&contact, &signals, &intent, fallback, now);
        let breakdown_json = serde_json::to_string(&outcome.breakdown)
            .map_err(|e| LeadpilotError::Internal(format!("breakdown serialization: {e}")))?;

        self.storage
            .record_lead_score(
                &LeadScoreUpdate {
                    score: outcome.score,
                    status: outcome.status,
                    category: outcome.category,
                },
                &ScoreRecord {
                    id: uuid::Uuid::new_v4().to_string(),
                    contact_id: contact_id.to_string(),
                    score: outcome.score,
                    status: outcome.status,
                    category: outcome.category,
                    previous_status: contact.lead_status,
                    breakdown: breakdown_json,
                    scored_at: now,
                },
            )
            .await?;

        let status_changed = contact.lead_status != Some(outcome.status);
        if status_changed {
            info!(
                contact_id,
                score = outcome.score,
                from = ?contact.lead_status,
                to = %outcome.status,
                "lead status changed"
            );
        } else {
            debug!(contact_id, score = outcome.score, status = %outcome.status, "contact scored");
        }

        Ok(LeadScore {
            contact_id: contact_id.to_string(),
            score: outcome.score,
            status: outcome.status,
            category: outcome.category,
            previous_status: contact.lead_status,
            status_changed,
            breakdown: outcome.breakdown,
            scored_at: now,
        })
    }

    /// Runs the classifier under the configured timeout.
    ///
    /// Returns the analysis and whether the neutral fallback was used.
    async fn analyze_intent(&self, request: IntentRequest) -> (IntentAnalysis, bool) {
        let Some(classifier) = &self.classifier else {
            return (IntentAnalysis::neutral(), true);
        };
        let contact_id = request.contact_id.clone();
        let timeout = Duration::from_secs(self.config.classifier_timeout_secs);

        match tokio::time::timeout(timeout, classifier.classify(request)).await {
            Ok(Ok(analysis)) => (analysis, false),
            Ok(Err(e)) => {
                warn!(contact_id, error = %e, "intent classification failed, using neutral intent");
                (IntentAnalysis::neutral(), true)
            }
            Err(_elapsed) => {
                warn!(
                    contact_id,
                    timeout_secs = timeout.as_secs(),
                    "intent classification timed out, using neutral intent"
                );
                (IntentAnalysis::neutral(), true)
            }
        }
    }
}
