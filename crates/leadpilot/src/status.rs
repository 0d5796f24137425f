// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `leadpilot status` command implementation.
//!
//! Shows a contact's cached lead score, its resolved active agent, the
//! agent queue, and every assignment on record.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use leadpilot_core::types::{
    AgentAssignment, AgentType, AssignmentStatus, LeadStatus, LikelihoodCategory,
};
use leadpilot_core::{LeadpilotError, StorageAdapter};
use serde::Serialize;

use crate::app::Services;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub contact_id: String,
    pub name: Option<String>,
    pub lead_score: Option<i32>,
    pub lead_status: Option<LeadStatus>,
    pub likelihood_category: Option<LikelihoodCategory>,
    pub last_scored_at: Option<DateTime<Utc>>,
    pub active_agent: Option<AgentSummary>,
    pub queue: Vec<AgentSummary>,
    pub help_mode_until: Option<DateTime<Utc>>,
    pub assignments: Vec<AgentSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgentSummary {
    pub id: String,
    pub agent_type: AgentType,
    pub status: AssignmentStatus,
    pub expires_at: Option<DateTime<Utc>>,
    pub messages_sent: i64,
    pub replies_received: i64,
}

impl From<&AgentAssignment> for AgentSummary {
    fn from(a: &AgentAssignment) -> Self {
        Self {
            id: a.id.clone(),
            agent_type: a.agent_type,
            status: a.status,
            expires_at: a.expires_at,
            messages_sent: a.messages_sent,
            replies_received: a.replies_received,
        }
    }
}

/// Format an optional expiration for display.
fn format_expiry(expires_at: Option<DateTime<Utc>>) -> String {
    match expires_at {
        Some(at) => at.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "never".to_string(),
    }
}

/// Run the `leadpilot status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    services: &Services,
    contact_id: &str,
    json: bool,
    plain: bool,
) -> Result<(), LeadpilotError> {
    let contact = services
        .storage
        .get_contact(contact_id)
        .await?
        .ok_or_else(|| LeadpilotError::not_found("contact", contact_id))?;
    let agents = services.orchestrator.describe(contact_id).await?;
    let last_scored_at = services
        .storage
        .list_score_records(contact_id, 1)
        .await?
        .first()
        .map(|r| r.scored_at);

    // Queue entries only carry ids, so look each one up in the assignment list.
    let queue = agents
        .state
        .agent_queue
        .iter()
        .filter_map(|q| agents.assignments.iter().find(|a| a.id == q.agent_id))
        .map(AgentSummary::from)
        .collect();

    let response = StatusResponse {
        contact_id: contact.id.clone(),
        name: contact.name.clone(),
        lead_score: contact.lead_score,
        lead_status: contact.lead_status,
        likelihood_category: contact.likelihood_category,
        last_scored_at,
        active_agent: agents.active.as_ref().map(AgentSummary::from),
        queue,
        help_mode_until: if agents.help_mode {
            agents.state.help_mode_until
        } else {
            None
        },
        assignments: agents.assignments.iter().map(AgentSummary::from).collect(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&response, use_color);
    }
    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  leadpilot status: {}", status.contact_id);
    println!("  {}", "-".repeat(35));

    if let Some(name) = &status.name {
        println!("    Name:     {name}");
    }

    match (status.lead_score, status.lead_status) {
        (Some(score), Some(lead_status)) => {
            let category = status
                .likelihood_category
                .map(|c| c.to_string())
                .unwrap_or_default();
            println!("    Score:    {score} ({lead_status}, {category})");
        }
        _ => println!("    Score:    not scored"),
    }

    match &status.active_agent {
        Some(agent) if use_color => {
            use colored::Colorize;
            println!(
                "    Active:   {} {} (expires {})",
                "✓".green(),
                agent.agent_type.to_string().green(),
                format_expiry(agent.expires_at)
            );
        }
        Some(agent) => println!(
            "    Active:   [OK] {} (expires {})",
            agent.agent_type,
            format_expiry(agent.expires_at)
        ),
        None if use_color => {
            use colored::Colorize;
            println!("    Active:   {}", "none".yellow());
        }
        None => println!("    Active:   [NONE]"),
    }

    if let Some(until) = status.help_mode_until {
        println!("    Help:     until {}", format_expiry(Some(until)));
    }

    if !status.queue.is_empty() {
        let queued: Vec<String> = status
            .queue
            .iter()
            .map(|a| a.agent_type.to_string())
            .collect();
        println!("    Queue:    {}", queued.join(" -> "));
    }

    println!();
    for agent in &status.assignments {
        println!(
            "    {:<18} {:<10} sent {:<4} replies {:<4} expires {}",
            agent.agent_type.to_string(),
            agent.status.to_string(),
            agent.messages_sent,
            agent.replies_received,
            format_expiry(agent.expires_at)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(agent_type: AgentType) -> AgentSummary {
        AgentSummary {
            id: "a-1".to_string(),
            agent_type,
            status: AssignmentStatus::Active,
            expires_at: None,
            messages_sent: 2,
            replies_received: 1,
        }
    }

    #[test]
    fn format_expiry_indefinite() {
        assert_eq!(format_expiry(None), "never");
    }

    #[test]
    fn format_expiry_timestamp() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(format_expiry(Some(at)), "2026-03-01 09:30 UTC");
    }

    #[test]
    fn status_response_serializes() {
        let resp = StatusResponse {
            contact_id: "c-1".to_string(),
            name: Some("Ada".to_string()),
            lead_score: Some(82),
            lead_status: Some(LeadStatus::ReadyToBuy),
            likelihood_category: Some(LikelihoodCategory::Hot),
            last_scored_at: None,
            active_agent: Some(summary(AgentType::Sales)),
            queue: vec![summary(AgentType::Retention)],
            help_mode_until: None,
            assignments: vec![],
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"lead_status\":\"ready_to_buy\""));
        assert!(json.contains("\"agent_type\":\"sales\""));
        assert!(json.contains("\"agent_type\":\"retention\""));
    }

    #[test]
    fn status_response_unscored_serializes() {
        let resp = StatusResponse {
            contact_id: "c-2".to_string(),
            name: None,
            lead_score: None,
            lead_status: None,
            likelihood_category: None,
            last_scored_at: None,
            active_agent: None,
            queue: vec![],
            help_mode_until: None,
            assignments: vec![],
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"active_agent\":null"));
        assert!(json.contains("\"lead_score\":null"));
    }
}
