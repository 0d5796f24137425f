// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the Leadpilot engine.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::LeadpilotError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter plugged into the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    IntentClassifier,
    MessageGenerator,
    SegmentResolver,
}

// --- Agents and assignments ---

/// The fixed set of conversational agent personas.
///
/// `CustomerService` is privileged: it never expires and it owns the
/// contact for the whole help-mode window.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AgentType {
    Sales,
    CustomerService,
    Onboarding,
    Retention,
    Upsell,
    Reengagement,
    ProductConcierge,
}

impl AgentType {
    /// Every agent type, in declaration order.
    pub const ALL: [AgentType; 7] = [
        AgentType::Sales,
        AgentType::CustomerService,
        AgentType::Onboarding,
        AgentType::Retention,
        AgentType::Upsell,
        AgentType::Reengagement,
        AgentType::ProductConcierge,
    ];

    pub fn is_customer_service(self) -> bool {
        self == AgentType::CustomerService
    }

    /// Built-in lifetime for assignments of this type.
    pub fn default_lifetime(self) -> AgentLifetime {
        match self {
            AgentType::CustomerService => AgentLifetime::Indefinite,
            AgentType::Sales => AgentLifetime::Days(30),
            AgentType::Onboarding => AgentLifetime::Days(14),
            AgentType::Retention => AgentLifetime::Days(60),
            AgentType::Upsell => AgentLifetime::Days(21),
            AgentType::Reengagement => AgentLifetime::Days(10),
            AgentType::ProductConcierge => AgentLifetime::Days(90),
        }
    }
}

/// How long an assignment stays eligible after it is (re)activated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentLifetime {
    Days(u32),
    /// Never expires. No arithmetic is ever applied to this variant.
    Indefinite,
}

impl AgentLifetime {
    /// Expiration timestamp for an assignment activated at `from`.
    ///
    /// Returns `Ok(None)` for [`AgentLifetime::Indefinite`], and an
    /// `InvalidState` error when the lifetime runs past the representable range.
    pub fn expires_at(self, from: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, LeadpilotError> {
        match self {
            AgentLifetime::Days(days) => Duration::try_days(i64::from(days))
                .and_then(|lifetime| from.checked_add_signed(lifetime))
                .map(Some)
                .ok_or_else(|| {
                    LeadpilotError::InvalidState(format!(
                        "agent lifetime of {days} days from {from} is out of range"
                    ))
                }),
            AgentLifetime::Indefinite => Ok(None),
        }
    }
}

/// Lifecycle status of a single agent assignment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Active,
    Paused,
    Expired,
    Converted,
    Archived,
}

/// Which physical record kind an assignment was read from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AssignmentSource {
    /// Row in `agent_conversations`, created by campaigns and help mode.
    Conversation,
    /// Row in `product_agents`, bound to one owned product.
    ProductAgent,
}

/// One (contact, agent type) engagement record, regardless of record kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentAssignment {
    pub id: String,
    pub contact_id: String,
    pub agent_type: AgentType,
    pub source: AssignmentSource,
    pub status: AssignmentStatus,
    /// Only set for [`AssignmentSource::ProductAgent`] rows.
    pub product_id: Option<String>,
    /// `None` means the assignment never expires.
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_at: DateTime<Utc>,
    pub messages_sent: i64,
    pub replies_received: i64,
    pub created_at: DateTime<Utc>,
}

impl AgentAssignment {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Active status and not past its expiration.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.status == AssignmentStatus::Active && !self.is_expired(now)
    }
}

/// Conditional upsert keyed by (contact, agent type) within one record kind.
///
/// An existing row is reactivated in place: status goes back to active, the
/// expiration and assignment time are refreshed, and counters are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentUpsert {
    pub contact_id: String,
    pub agent_type: AgentType,
    pub source: AssignmentSource,
    pub product_id: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub assigned_at: DateTime<Utc>,
}

/// An agent displaced by a higher-priority one, waiting to resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedAgent {
    pub agent_id: String,
    pub agent_type: AgentType,
    pub queued_at: DateTime<Utc>,
}

/// Per-contact ground truth for which agent may speak next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    pub contact_id: String,
    pub active_agent_id: Option<String>,
    pub agent_queue: Vec<QueuedAgent>,
    pub help_mode_until: Option<DateTime<Utc>>,
    pub last_engagement_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ConversationState {
    /// Empty state for a contact that has never had an agent.
    pub fn new(contact_id: impl Into<String>) -> Self {
        Self {
            contact_id: contact_id.into(),
            active_agent_id: None,
            agent_queue: Vec::new(),
            help_mode_until: None,
            last_engagement_at: None,
            updated_at: None,
        }
    }

    pub fn help_mode_active(&self, now: DateTime<Utc>) -> bool {
        self.help_mode_until.is_some_and(|until| until > now)
    }

    /// Appends an entry unless the agent is already queued. Returns whether it was added.
    pub fn enqueue(&mut self, entry: QueuedAgent) -> bool {
        if self.is_queued(&entry.agent_id) {
            return false;
        }
        self.agent_queue.push(entry);
        true
    }

    pub fn is_queued(&self, agent_id: &str) -> bool {
        self.agent_queue.iter().any(|q| q.agent_id == agent_id)
    }
}

// --- Contacts and signals ---

/// Messaging channel for conversations and generated messages.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Sms,
    Email,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Inbound,
    Outbound,
}

/// Lead status derived from the score thresholds.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    ReadyToBuy,
    Hot,
    Warm,
    Neutral,
    Cold,
}

/// Coarse likelihood bucket shown alongside the status.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LikelihoodCategory {
    Hot,
    Warm,
    Cold,
}

/// A person or organization record, limited to the fields the engine reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: Option<String>,
    pub last_engagement_date: Option<DateTime<Utc>>,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub total_spent: f64,
    pub products_owned: Vec<String>,
    pub tags: Vec<String>,
    pub has_dispute: bool,
    pub disputed_amount: f64,
    pub last_purchase_date: Option<DateTime<Utc>>,
    pub customer_tier: Option<String>,
    pub lead_score: Option<i32>,
    pub lead_status: Option<LeadStatus>,
    pub likelihood_category: Option<LikelihoodCategory>,
}

impl Contact {
    /// A contact with no history, spend, tags, or cached score.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            last_engagement_date: None,
            last_contact_date: None,
            total_spent: 0.0,
            products_owned: Vec::new(),
            tags: Vec::new(),
            has_dispute: false,
            disputed_amount: 0.0,
            last_purchase_date: None,
            customer_tier: None,
            lead_score: None,
            lead_status: None,
            likelihood_category: None,
        }
    }

    /// Dispute flag or a positive disputed amount.
    pub fn has_active_dispute(&self) -> bool {
        self.has_dispute || self.disputed_amount > 0.0
    }
}

/// A single SMS or email exchanged with a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: String,
    pub contact_id: String,
    pub channel: Channel,
    pub direction: MessageDirection,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EngagementEventKind {
    EmailSent,
    EmailOpened,
    WebinarAttended,
    FormSubmitted,
}

/// An activity event recorded against a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementEvent {
    pub id: String,
    pub contact_id: String,
    pub kind: EngagementEventKind,
    pub occurred_at: DateTime<Utc>,
}

/// Aggregated engagement counts consumed by the scorer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngagementSignals {
    pub emails_sent: u32,
    pub emails_opened: u32,
    pub inbound_sms_replies: u32,
    pub webinars_attended: u32,
    pub forms_submitted: u32,
}

impl EngagementSignals {
    /// Opened / sent as a fraction. Zero when nothing was sent.
    pub fn email_open_rate(&self) -> f64 {
        if self.emails_sent == 0 {
            return 0.0;
        }
        f64::from(self.emails_opened) / f64::from(self.emails_sent)
    }
}

/// Cached score fields written back to the contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadScoreUpdate {
    pub score: i32,
    pub status: LeadStatus,
    pub category: LikelihoodCategory,
}

/// One row of score history, with the breakdown kept as JSON for audit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: String,
    pub contact_id: String,
    pub score: i32,
    pub status: LeadStatus,
    pub category: LikelihoodCategory,
    pub previous_status: Option<LeadStatus>,
    pub breakdown: String,
    pub scored_at: DateTime<Utc>,
}

// --- Intent classification ---

/// Ordinal strength of the buying signal found in recent messages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IntentLevel {
    None,
    Low,
    Moderate,
    Strong,
    Immediate,
}

/// Output of the external intent classifier. Lives for one scoring call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentAnalysis {
    pub intent_level: IntentLevel,
    /// Continuous sub-score in 0..=100.
    pub intent_score: f64,
    pub confidence: f64,
    #[serde(default)]
    pub key_signals: Vec<String>,
    #[serde(default)]
    pub sentiment: String,
}

impl IntentAnalysis {
    /// Fallback used whenever the classifier cannot answer.
    pub fn neutral() -> Self {
        Self {
            intent_level: IntentLevel::Low,
            intent_score: 50.0,
            confidence: 0.5,
            key_signals: Vec::new(),
            sentiment: "neutral".to_string(),
        }
    }
}

/// Compact contact context sent along with the messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentContext {
    pub total_spent: f64,
    pub products_owned: Vec<String>,
    pub tier: Option<String>,
}

/// Input to the intent classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRequest {
    pub contact_id: String,
    /// Newest first.
    pub messages: Vec<ContactMessage>,
    pub context: IntentContext,
}

// --- Message generation ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Introduction,
    Handoff,
    FollowUp,
    Help,
}

/// Why a message is being generated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerContext {
    pub campaign_id: Option<String>,
    pub campaign_strategy: Option<String>,
    /// Set for handoffs so the text can acknowledge the transition.
    pub previous_agent_type: Option<AgentType>,
}

/// Input to the external message generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub contact_id: String,
    pub assignment_id: String,
    pub message_type: MessageType,
    pub trigger: TriggerContext,
    pub channel: Channel,
}

/// Generated text. Opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMessage {
    pub body: String,
}

// --- Campaigns ---

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Completed,
}

/// Stored segment definition, resolved to contact ids by a segment resolver.
///
/// Every populated criterion must match. An empty filter matches every contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AudienceFilter {
    /// Contact must carry at least one of these tags.
    pub tags_any: Vec<String>,
    /// Contact must carry none of these tags.
    pub exclude_tags: Vec<String>,
    pub min_lead_score: Option<i32>,
    pub max_lead_score: Option<i32>,
    pub lead_statuses: Vec<LeadStatus>,
    pub owns_product: Option<String>,
    pub min_total_spent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub name: String,
    pub agent_type: AgentType,
    pub strategy: Option<String>,
    pub audience_filter: AudienceFilter,
    pub channel: Channel,
    pub status: CampaignStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub contact_count: i64,
    pub engaged_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    Pending,
    Active,
    Failed,
}

/// Diagnostic record stored on a failed campaign membership.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignContactError {
    pub message: String,
    pub raw_error: String,
    pub timestamp: DateTime<Utc>,
    pub retry_count: u32,
    pub message_type: MessageType,
    pub contact_name: Option<String>,
}

/// Join row between a campaign and a contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignContact {
    pub campaign_id: String,
    pub contact_id: String,
    pub status: MembershipStatus,
    pub agent_conversation_id: Option<String>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub last_error: Option<CampaignContactError>,
}

// --- Queue ---

/// An entry in the crash-safe work queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_name: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub max_attempts: i32,
    pub created_at: String,
    pub updated_at: String,
    pub locked_until: Option<String>,
}

/// Outcome of marking a queue entry as failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueFailure {
    /// Returned to pending for another attempt.
    Retrying { attempts: i32 },
    /// Out of attempts, left in `failed`.
    Exhausted { attempts: i32 },
}

/// RFC 3339 helpers for timestamps persisted as text.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};

    /// Millisecond-precision UTC text. Sorts lexicographically in time order.
    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn parse(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(text).map(|dt| dt.with_timezone(&Utc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn at(text: &str) -> DateTime<Utc> {
        timestamp::parse(text).unwrap()
    }

    fn assignment(status: AssignmentStatus, expires_at: Option<DateTime<Utc>>) -> AgentAssignment {
        AgentAssignment {
            id: "a-1".into(),
            contact_id: "c-1".into(),
            agent_type: AgentType::Sales,
            source: AssignmentSource::Conversation,
            status,
            product_id: None,
            expires_at,
            assigned_at: at("2026-01-01T00:00:00Z"),
            messages_sent: 0,
            replies_received: 0,
            created_at: at("2026-01-01T00:00:00Z"),
        }
    }

    #[test]
    fn agent_type_uses_snake_case_names() {
        assert_eq!(AgentType::CustomerService.to_string(), "customer_service");
        assert_eq!(
            AgentType::from_str("product_concierge").unwrap(),
            AgentType::ProductConcierge
        );
        let json = serde_json::to_string(&AgentType::Sales).unwrap();
        assert_eq!(json, "\"sales\"");
    }

    #[test]
    fn only_customer_service_is_indefinite() {
        for agent_type in AgentType::ALL {
            let indefinite = agent_type.default_lifetime() == AgentLifetime::Indefinite;
            assert_eq!(indefinite, agent_type.is_customer_service(), "{agent_type}");
        }
    }

    #[test]
    fn lifetime_days_add_to_start() {
        let start = at("2026-03-01T12:00:00Z");
        assert_eq!(
            AgentLifetime::Days(30).expires_at(start).unwrap(),
            Some(at("2026-03-31T12:00:00Z"))
        );
        assert_eq!(AgentLifetime::Indefinite.expires_at(start).unwrap(), None);
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        let start = at("2026-03-01T12:00:00Z");
        let err = AgentLifetime::Days(200_000_000).expires_at(start).unwrap_err();
        assert!(matches!(err, LeadpilotError::InvalidState(_)), "{err:?}");
        assert!(AgentLifetime::Days(u32::MAX).expires_at(start).is_err());
    }

    #[test]
    fn expired_assignment_is_not_live_even_if_active() {
        let now = at("2026-02-01T00:00:00Z");
        let stale = assignment(AssignmentStatus::Active, Some(at("2026-01-15T00:00:00Z")));
        assert!(stale.is_expired(now));
        assert!(!stale.is_live(now));

        let forever = assignment(AssignmentStatus::Active, None);
        assert!(forever.is_live(now));

        let paused = assignment(AssignmentStatus::Paused, None);
        assert!(!paused.is_live(now));
    }

    #[test]
    fn enqueue_deduplicates_by_agent_id() {
        let mut state = ConversationState::new("c-1");
        let entry = QueuedAgent {
            agent_id: "a-1".into(),
            agent_type: AgentType::Sales,
            queued_at: at("2026-01-01T00:00:00Z"),
        };
        assert!(state.enqueue(entry.clone()));
        assert!(!state.enqueue(entry));
        assert_eq!(state.agent_queue.len(), 1);
    }

    #[test]
    fn help_mode_requires_future_timestamp() {
        let now = at("2026-01-01T10:00:00Z");
        let mut state = ConversationState::new("c-1");
        assert!(!state.help_mode_active(now));
        state.help_mode_until = Some(at("2026-01-01T09:00:00Z"));
        assert!(!state.help_mode_active(now));
        state.help_mode_until = Some(at("2026-01-01T11:00:00Z"));
        assert!(state.help_mode_active(now));
    }

    #[test]
    fn intent_levels_are_ordered() {
        assert!(IntentLevel::Immediate > IntentLevel::Strong);
        assert!(IntentLevel::Strong > IntentLevel::Moderate);
        assert!(IntentLevel::Low > IntentLevel::None);
        assert_eq!(IntentLevel::None.to_string(), "none");
    }

    #[test]
    fn open_rate_is_zero_without_sends() {
        let signals = EngagementSignals::default();
        assert_eq!(signals.email_open_rate(), 0.0);
        let signals = EngagementSignals {
            emails_sent: 4,
            emails_opened: 1,
            ..Default::default()
        };
        assert!((signals.email_open_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn dispute_flag_or_amount_counts() {
        let mut contact = Contact::new("c-1");
        assert!(!contact.has_active_dispute());
        contact.disputed_amount = 12.5;
        assert!(contact.has_active_dispute());
        contact.disputed_amount = 0.0;
        contact.has_dispute = true;
        assert!(contact.has_active_dispute());
    }

    #[test]
    fn audience_filter_rejects_unknown_keys() {
        let ok: AudienceFilter = serde_json::from_str(r#"{"tags_any":["vip"]}"#).unwrap();
        assert_eq!(ok.tags_any, vec!["vip"]);
        assert!(serde_json::from_str::<AudienceFilter>(r#"{"tag":"vip"}"#).is_err());
    }

    #[test]
    fn timestamps_roundtrip_through_text() {
        let now = at("2026-05-04T03:02:01.123Z");
        let text = timestamp::format(&now);
        assert_eq!(text, "2026-05-04T03:02:01.123Z");
        assert_eq!(timestamp::parse(&text).unwrap(), now);
    }
}
