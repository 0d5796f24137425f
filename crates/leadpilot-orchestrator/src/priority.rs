// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The priority rule deciding which agent may speak to a contact.
//!
//! Everything here is pure: callers load assignments and state, resolve, and
//! persist the result under the contact's lock.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use leadpilot_core::types::{AgentAssignment, AgentType, ConversationState, QueuedAgent};

/// Outcome of one priority recalculation.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub active: Option<AgentAssignment>,
    /// FIFO queue of displaced live agents, without the active one.
    pub queue: Vec<QueuedAgent>,
}

impl Resolution {
    pub fn active_id(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    /// Writes the active agent and queue into `state`.
    pub fn apply(&self, state: &mut ConversationState) {
        state.active_agent_id = self.active.as_ref().map(|a| a.id.clone());
        state.agent_queue = self.queue.clone();
    }
}

/// Merges both record kinds into one assignment per agent type.
///
/// When a type appears more than once, a live row beats a dead one and the
/// more recently assigned row wins ties. Output is newest first.
pub fn unify_assignments(
    assignments: Vec<AgentAssignment>,
    now: DateTime<Utc>,
) -> Vec<AgentAssignment> {
    let mut by_type: BTreeMap<AgentType, AgentAssignment> = BTreeMap::new();
    for assignment in assignments {
        match by_type.get(&assignment.agent_type) {
            Some(existing) if !supersedes(&assignment, existing, now) => {}
            _ => {
                by_type.insert(assignment.agent_type, assignment);
            }
        }
    }
    let mut unified: Vec<AgentAssignment> = by_type.into_values().collect();
    unified.sort_by(|a, b| b.assigned_at.cmp(&a.assigned_at));
    unified
}

fn supersedes(candidate: &AgentAssignment, existing: &AgentAssignment, now: DateTime<Utc>) -> bool {
    match (candidate.is_live(now), existing.is_live(now)) {
        (true, false) => true,
        (false, true) => false,
        _ => candidate.assigned_at > existing.assigned_at,
    }
}

/// Picks the active agent and rebuilds the queue.
///
/// During help mode only a live customer-service assignment may be active,
/// and no agent is active without one. Otherwise the most recently assigned
/// live non-CS agent wins, with live CS as the last resort. Queue entries
/// that are no longer live are dropped, existing order is kept, and any
/// other live agents are appended oldest first.
pub fn resolve_priority(
    assignments: &[AgentAssignment],
    state: &ConversationState,
    now: DateTime<Utc>,
) -> Resolution {
    let live: Vec<AgentAssignment> = unify_assignments(assignments.to_vec(), now)
        .into_iter()
        .filter(|a| a.is_live(now))
        .collect();

    let most_recent_cs = live.iter().find(|a| a.agent_type.is_customer_service());
    let active = if state.help_mode_active(now) {
        most_recent_cs.cloned()
    } else {
        live.iter()
            .find(|a| !a.agent_type.is_customer_service())
            .or(most_recent_cs)
            .cloned()
    };
    let active_id = active.as_ref().map(|a| a.id.as_str());

    let mut queue: Vec<QueuedAgent> = state
        .agent_queue
        .iter()
        .filter(|q| Some(q.agent_id.as_str()) != active_id)
        .filter(|q| live.iter().any(|a| a.id == q.agent_id))
        .cloned()
        .collect();

    for assignment in live.iter().rev() {
        if Some(assignment.id.as_str()) == active_id
            || queue.iter().any(|q| q.agent_id == assignment.id)
        {
            continue;
        }
        queue.push(QueuedAgent {
            agent_id: assignment.id.clone(),
            agent_type: assignment.agent_type,
            queued_at: now,
        });
    }

    Resolution { active, queue }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use leadpilot_core::types::{AssignmentSource, AssignmentStatus};

    fn now() -> DateTime<Utc> {
        leadpilot_core::types::timestamp::parse("2026-03-10T09:00:00.000Z").unwrap()
    }

    fn assignment(id: &str, agent_type: AgentType, hours_ago: i64) -> AgentAssignment {
        let assigned_at = now() - Duration::hours(hours_ago);
        AgentAssignment {
            id: id.to_string(),
            contact_id: "c-1".into(),
            agent_type,
            source: AssignmentSource::Conversation,
            status: AssignmentStatus::Active,
            product_id: None,
            expires_at: agent_type
                .default_lifetime()
                .expires_at(assigned_at)
                .unwrap(),
            assigned_at,
            messages_sent: 0,
            replies_received: 0,
            created_at: assigned_at,
        }
    }

    fn state() -> ConversationState {
        ConversationState::new("c-1")
    }

    #[test]
    fn newest_non_cs_agent_wins() {
        let assignments = vec![
            assignment("sales", AgentType::Sales, 5),
            assignment("upsell", AgentType::Upsell, 1),
            assignment("cs", AgentType::CustomerService, 0),
        ];
        let resolution = resolve_priority(&assignments, &state(), now());
        assert_eq!(resolution.active_id(), Some("upsell"));
        let queued: Vec<&str> = resolution.queue.iter().map(|q| q.agent_id.as_str()).collect();
        assert_eq!(queued, vec!["sales", "cs"]);
    }

    #[test]
    fn cs_is_fallback_outside_help_mode() {
        let assignments = vec![assignment("cs", AgentType::CustomerService, 3)];
        let resolution = resolve_priority(&assignments, &state(), now());
        assert_eq!(resolution.active_id(), Some("cs"));
        assert!(resolution.queue.is_empty());
    }

    #[test]
    fn help_mode_forces_cs() {
        let mut state = state();
        state.help_mode_until = Some(now() + Duration::minutes(30));
        let assignments = vec![
            assignment("sales", AgentType::Sales, 0),
            assignment("cs", AgentType::CustomerService, 48),
        ];
        let resolution = resolve_priority(&assignments, &state, now());
        assert_eq!(resolution.active_id(), Some("cs"));
        assert_eq!(resolution.queue.len(), 1);
        assert_eq!(resolution.queue[0].agent_id, "sales");
    }

    #[test]
    fn help_mode_without_cs_has_no_active_agent() {
        let mut state = state();
        state.help_mode_until = Some(now() + Duration::minutes(5));
        let assignments = vec![assignment("sales", AgentType::Sales, 0)];
        let resolution = resolve_priority(&assignments, &state, now());
        assert_eq!(resolution.active, None);
        assert_eq!(resolution.queue[0].agent_id, "sales");
    }

    #[test]
    fn lapsed_help_mode_is_ignored() {
        let mut state = state();
        state.help_mode_until = Some(now() - Duration::minutes(1));
        let assignments = vec![
            assignment("sales", AgentType::Sales, 2),
            assignment("cs", AgentType::CustomerService, 1),
        ];
        let resolution = resolve_priority(&assignments, &state, now());
        assert_eq!(resolution.active_id(), Some("sales"));
    }

    #[test]
    fn expired_assignment_counts_as_absent() {
        let mut reengagement = assignment("re", AgentType::Reengagement, 24 * 11);
        // Persisted status is still active; only the timestamp says otherwise.
        assert_eq!(reengagement.status, AssignmentStatus::Active);
        reengagement.expires_at = Some(now() - Duration::hours(1));
        let assignments = vec![reengagement, assignment("sales", AgentType::Sales, 24 * 12)];

        let resolution = resolve_priority(&assignments, &state(), now());
        assert_eq!(resolution.active_id(), Some("sales"));
        assert!(resolution.queue.is_empty());
    }

    #[test]
    fn non_active_statuses_are_not_live() {
        let mut paused = assignment("upsell", AgentType::Upsell, 0);
        paused.status = AssignmentStatus::Paused;
        let mut converted = assignment("sales", AgentType::Sales, 1);
        converted.status = AssignmentStatus::Converted;
        let resolution = resolve_priority(&[paused, converted], &state(), now());
        assert_eq!(resolution.active, None);
        assert!(resolution.queue.is_empty());
    }

    #[test]
    fn existing_queue_order_is_kept_and_stale_entries_dropped() {
        let mut state = state();
        let queued_at = now() - Duration::days(1);
        for (id, agent_type) in [
            ("retention", AgentType::Retention),
            ("gone", AgentType::Onboarding),
            ("sales", AgentType::Sales),
        ] {
            state.enqueue(QueuedAgent {
                agent_id: id.into(),
                agent_type,
                queued_at,
            });
        }
        let assignments = vec![
            assignment("sales", AgentType::Sales, 10),
            assignment("retention", AgentType::Retention, 20),
            assignment("upsell", AgentType::Upsell, 1),
        ];
        let resolution = resolve_priority(&assignments, &state, now());
        assert_eq!(resolution.active_id(), Some("upsell"));
        let queued: Vec<&str> = resolution.queue.iter().map(|q| q.agent_id.as_str()).collect();
        assert_eq!(queued, vec!["retention", "sales"]);
        assert!(resolution.queue.iter().all(|q| q.queued_at == queued_at));
    }

    #[test]
    fn newly_active_agent_leaves_the_queue() {
        let mut state = state();
        state.enqueue(QueuedAgent {
            agent_id: "sales".into(),
            agent_type: AgentType::Sales,
            queued_at: now(),
        });
        let resolution = resolve_priority(&[assignment("sales", AgentType::Sales, 0)], &state, now());
        assert_eq!(resolution.active_id(), Some("sales"));
        assert!(resolution.queue.is_empty());
    }

    #[test]
    fn unify_prefers_live_then_newest_per_type() {
        let mut dead = assignment("pc-old", AgentType::ProductConcierge, 0);
        dead.status = AssignmentStatus::Archived;
        let mut live = assignment("pc-live", AgentType::ProductConcierge, 5);
        live.source = AssignmentSource::ProductAgent;
        let older = assignment("sales-a", AgentType::Sales, 9);
        let newer = assignment("sales-b", AgentType::Sales, 2);

        let unified = unify_assignments(vec![dead, live, older, newer], now());
        let ids: Vec<&str> = unified.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["sales-b", "pc-live"]);
    }

    #[test]
    fn apply_writes_active_and_queue() {
        let assignments = vec![
            assignment("sales", AgentType::Sales, 3),
            assignment("upsell", AgentType::Upsell, 1),
        ];
        let mut state = state();
        state.active_agent_id = Some("stale".into());
        resolve_priority(&assignments, &state, now()).apply(&mut state);
        assert_eq!(state.active_agent_id.as_deref(), Some("upsell"));
        assert!(state.is_queued("sales"));
    }
}
