// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Weighted score components.
//!
//! Every component is a pure function of contact fields, aggregated signals
//! and the classifier output. Tier tables are ordered from the highest
//! threshold down and the first matching row wins.

use chrono::{DateTime, Utc};
use leadpilot_core::types::{
    Contact, EngagementSignals, IntentAnalysis, LeadStatus, LikelihoodCategory,
};
use serde::Serialize;

/// Points awarded for an intent sub-score of 100.
const INTENT_MAX_POINTS: f64 = 30.0;

/// Email open rate (fraction) -> points.
const OPEN_RATE_TIERS: &[(f64, i32)] = &[(0.5, 10), (0.3, 7), (0.1, 4)];

/// Inbound SMS replies -> points.
const SMS_REPLY_TIERS: &[(u32, i32)] = &[(5, 10), (2, 6), (1, 3)];

/// Lifetime revenue -> points.
const REVENUE_TIERS: &[(f64, i32)] = &[
    (10_000.0, 20),
    (5_000.0, 15),
    (1_000.0, 10),
    (250.0, 6),
    (1.0, 3),
];

const PRODUCT_TIERS: &[(u32, i32)] = &[(4, 10), (3, 8), (2, 5), (1, 3)];

const WEBINAR_TIERS: &[(u32, i32)] = &[(4, 12), (3, 10), (2, 7), (1, 4)];

const FORM_TIERS: &[(u32, i32)] = &[(4, 8), (3, 6), (2, 5), (1, 3)];

/// Days since last engagement (upper bound, inclusive) -> penalty.
const DECAY_TIERS: &[(i64, i32)] = &[
    (7, 0),
    (14, -3),
    (30, -7),
    (60, -12),
    (90, -18),
    (180, -24),
];

/// Penalty past the last decay tier, or with no engagement date at all.
const MAX_DECAY: i32 = -30;

/// Days since last purchase (upper bound, inclusive) -> penalty.
const RECENCY_TIERS: &[(i64, i32)] = &[(30, -30), (60, -20), (90, -10)];

/// Case-insensitive tag fragments and their negative points.
const NEGATIVE_TAGS: &[(&str, i32)] = &[("shitlist", 50), ("cancelled", 20), ("inactive", 10)];

const DISPUTE_POINTS: i32 = 40;

fn tier_at_least<T: PartialOrd + Copy>(value: T, tiers: &[(T, i32)]) -> i32 {
    tiers
        .iter()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(0, |(_, points)| *points)
}

fn tier_at_most(days: i64, tiers: &[(i64, i32)], beyond: i32) -> i32 {
    tiers
        .iter()
        .find(|(limit, _)| days <= *limit)
        .map_or(beyond, |(_, points)| *points)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageIntelligence {
    pub intent_points: i32,
    pub open_rate_points: i32,
    pub sms_reply_points: i32,
    pub total: i32,
}

/// Intent, email open rate and SMS replies. At most 50.
pub fn message_intelligence(
    intent: &IntentAnalysis,
    signals: &EngagementSignals,
) -> MessageIntelligence {
    let intent_points = (intent.intent_score.clamp(0.0, 100.0) * INTENT_MAX_POINTS / 100.0).round() as i32;
    let open_rate_points = tier_at_least(signals.email_open_rate(), OPEN_RATE_TIERS);
    let sms_reply_points = tier_at_least(signals.inbound_sms_replies, SMS_REPLY_TIERS);
    MessageIntelligence {
        intent_points,
        open_rate_points,
        sms_reply_points,
        total: (intent_points + open_rate_points + sms_reply_points).min(50),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchaseHistory {
    pub revenue_points: i32,
    pub product_points: i32,
    pub total: i32,
}

/// Lifetime spend and breadth of owned products. At most 30.
pub fn purchase_history(contact: &Contact) -> PurchaseHistory {
    let revenue_points = tier_at_least(contact.total_spent, REVENUE_TIERS);
    let owned = u32::try_from(contact.products_owned.len()).unwrap_or(u32::MAX);
    let product_points = tier_at_least(owned, PRODUCT_TIERS);
    PurchaseHistory {
        revenue_points,
        product_points,
        total: (revenue_points + product_points).min(30),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityEngagement {
    pub webinar_points: i32,
    pub form_points: i32,
    pub total: i32,
}

/// Webinar attendance and form submissions. At most 20.
pub fn activity_engagement(signals: &EngagementSignals) -> ActivityEngagement {
    let webinar_points = tier_at_least(signals.webinars_attended, WEBINAR_TIERS);
    let form_points = tier_at_least(signals.forms_submitted, FORM_TIERS);
    ActivityEngagement {
        webinar_points,
        form_points,
        total: (webinar_points + form_points).min(20),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeDecay {
    /// `None` when the contact has neither engagement nor contact date.
    pub days_since_engagement: Option<i64>,
    pub points: i32,
}

/// Penalty for time since the last engagement, falling back to the last contact date.
pub fn time_decay(contact: &Contact, now: DateTime<Utc>) -> TimeDecay {
    let reference = contact.last_engagement_date.or(contact.last_contact_date);
    match reference {
        Some(at) => {
            let days = (now - at).num_days();
            TimeDecay {
                days_since_engagement: Some(days),
                points: tier_at_most(days, DECAY_TIERS, MAX_DECAY),
            }
        }
        None => TimeDecay {
            days_since_engagement: None,
            points: MAX_DECAY,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchaseRecency {
    pub days_since_purchase: Option<i64>,
    pub points: i32,
}

/// Post-purchase cooldown. Zero without a purchase date.
pub fn purchase_recency(contact: &Contact, now: DateTime<Utc>) -> PurchaseRecency {
    match contact.last_purchase_date {
        Some(at) => {
            let days = (now - at).num_days();
            PurchaseRecency {
                days_since_purchase: Some(days),
                points: tier_at_most(days, RECENCY_TIERS, 0),
            }
        }
        None => PurchaseRecency {
            days_since_purchase: None,
            points: 0,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NegativeSignals {
    /// Sum of all matched penalties. Uncapped.
    pub points: i32,
    pub reasons: Vec<String>,
}

/// Tag and dispute penalties. Each rule applies at most once.
pub fn negative_signals(contact: &Contact) -> NegativeSignals {
    let mut points = 0;
    let mut reasons = Vec::new();

    for (fragment, penalty) in NEGATIVE_TAGS {
        let matched = contact
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(fragment));
        if matched {
            points += penalty;
            reasons.push(format!("tag:{fragment}"));
        }
    }
    if contact.has_active_dispute() {
        points += DISPUTE_POINTS;
        reasons.push("dispute".to_string());
    }

    NegativeSignals { points, reasons }
}

/// Maps a final score to its status and category.
pub fn classify(score: i32) -> (LeadStatus, LikelihoodCategory) {
    match score {
        s if s >= 80 => (LeadStatus::ReadyToBuy, LikelihoodCategory::Hot),
        s if s >= 70 => (LeadStatus::Hot, LikelihoodCategory::Hot),
        s if s >= 50 => (LeadStatus::Warm, LikelihoodCategory::Warm),
        s if s >= 30 => (LeadStatus::Neutral, LikelihoodCategory::Warm),
        _ => (LeadStatus::Cold, LikelihoodCategory::Cold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use leadpilot_core::types::IntentLevel;

    fn now() -> DateTime<Utc> {
        leadpilot_core::types::timestamp::parse("2026-06-01T12:00:00.000Z").unwrap()
    }

    fn intent(score: f64) -> IntentAnalysis {
        IntentAnalysis {
            intent_level: IntentLevel::Low,
            intent_score: score,
            confidence: 0.9,
            key_signals: Vec::new(),
            sentiment: "neutral".to_string(),
        }
    }

    #[test]
    fn intent_points_round_to_nearest() {
        let signals = EngagementSignals::default();
        assert_eq!(message_intelligence(&intent(40.0), &signals).intent_points, 12);
        assert_eq!(message_intelligence(&intent(45.0), &signals).intent_points, 14);
        assert_eq!(message_intelligence(&intent(100.0), &signals).intent_points, 30);
        assert_eq!(message_intelligence(&intent(250.0), &signals).intent_points, 30);
    }

    #[test]
    fn open_rate_and_reply_tiers() {
        let signals = EngagementSignals {
            emails_sent: 10,
            emails_opened: 3,
            inbound_sms_replies: 2,
            ..EngagementSignals::default()
        };
        let mi = message_intelligence(&intent(0.0), &signals);
        assert_eq!(mi.open_rate_points, 7);
        assert_eq!(mi.sms_reply_points, 6);

        let busy = EngagementSignals {
            emails_sent: 4,
            emails_opened: 4,
            inbound_sms_replies: 9,
            ..EngagementSignals::default()
        };
        assert_eq!(message_intelligence(&intent(100.0), &busy).total, 50);
    }

    #[test]
    fn revenue_and_product_tiers() {
        let mut c = Contact::new("c");
        c.total_spent = 12_000.0;
        c.products_owned = vec!["a".into(), "b".into()];
        let ph = purchase_history(&c);
        assert_eq!(ph.revenue_points, 20);
        assert_eq!(ph.product_points, 5);
        assert_eq!(ph.total, 25);

        c.total_spent = 0.5;
        c.products_owned.clear();
        assert_eq!(purchase_history(&c).total, 0);

        c.total_spent = 250.0;
        assert_eq!(purchase_history(&c).revenue_points, 6);
    }

    #[test]
    fn activity_tiers_cap_at_twenty() {
        let signals = EngagementSignals {
            webinars_attended: 6,
            forms_submitted: 5,
            ..EngagementSignals::default()
        };
        let ae = activity_engagement(&signals);
        assert_eq!(ae.webinar_points, 12);
        assert_eq!(ae.form_points, 8);
        assert_eq!(ae.total, 20);
    }

    #[test]
    fn decay_boundaries() {
        let mut c = Contact::new("c");
        for (days, expected) in [
            (0, 0),
            (7, 0),
            (8, -3),
            (14, -3),
            (30, -7),
            (31, -12),
            (90, -18),
            (180, -24),
            (181, -30),
        ] {
            c.last_engagement_date = Some(now() - Duration::days(days));
            assert_eq!(time_decay(&c, now()).points, expected, "{days} days");
        }
    }

    #[test]
    fn decay_falls_back_to_contact_date_then_maximum() {
        let mut c = Contact::new("c");
        c.last_contact_date = Some(now() - Duration::days(20));
        assert_eq!(time_decay(&c, now()).points, -7);

        c.last_contact_date = None;
        let decay = time_decay(&c, now());
        assert_eq!(decay.points, -30);
        assert_eq!(decay.days_since_engagement, None);
    }

    #[test]
    fn recency_penalty_tiers() {
        let mut c = Contact::new("c");
        assert_eq!(purchase_recency(&c, now()).points, 0);
        for (days, expected) in [(5, -30), (30, -30), (45, -20), (90, -10), (91, 0)] {
            c.last_purchase_date = Some(now() - Duration::days(days));
            assert_eq!(purchase_recency(&c, now()).points, expected, "{days} days");
        }
    }

    #[test]
    fn negative_tags_match_case_insensitively_once_each() {
        let mut c = Contact::new("c");
        c.tags = vec![
            "SHITLIST".to_string(),
            "shitlist-2024".to_string(),
            "Cancelled-Sub".to_string(),
        ];
        let neg = negative_signals(&c);
        assert_eq!(neg.points, 70);
        assert_eq!(neg.reasons, vec!["tag:shitlist", "tag:cancelled"]);
    }

    #[test]
    fn dispute_by_flag_or_amount() {
        let mut c = Contact::new("c");
        c.disputed_amount = 12.0;
        assert_eq!(negative_signals(&c).points, 40);
        c.disputed_amount = 0.0;
        c.has_dispute = true;
        c.tags = vec!["inactive".to_string()];
        assert_eq!(negative_signals(&c).points, 50);
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify(100), (LeadStatus::ReadyToBuy, LikelihoodCategory::Hot));
        assert_eq!(classify(80), (LeadStatus::ReadyToBuy, LikelihoodCategory::Hot));
        assert_eq!(classify(79), (LeadStatus::Hot, LikelihoodCategory::Hot));
        assert_eq!(classify(70), (LeadStatus::Hot, LikelihoodCategory::Hot));
        assert_eq!(classify(50), (LeadStatus::Warm, LikelihoodCategory::Warm));
        assert_eq!(classify(30), (LeadStatus::Neutral, LikelihoodCategory::Warm));
        assert_eq!(classify(29), (LeadStatus::Cold, LikelihoodCategory::Cold));
        assert_eq!(classify(0), (LeadStatus::Cold, LikelihoodCategory::Cold));
    }
}
