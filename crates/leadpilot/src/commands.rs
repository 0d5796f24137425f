// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scoring, orchestration and campaign subcommands.

use chrono::{Duration, Utc};
use leadpilot_campaign::ActivationSummary;
use leadpilot_core::LeadpilotError;
use leadpilot_core::types::ConversationState;
use leadpilot_scoring::ScoreJobReport;
use serde::Serialize;
use tracing::info;

use crate::app::Services;
use crate::shutdown::install_signal_handler;

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// `leadpilot score <contact>`
pub async fn run_score(services: &Services, contact_id: &str, json: bool) -> Result<(), LeadpilotError> {
    let score = services.engine.score_contact(contact_id).await?;
    if json {
        print_json(&score);
        return Ok(());
    }
    println!(
        "{}: {} ({}, {})",
        score.contact_id, score.score, score.status, score.category
    );
    if score.status_changed {
        let previous = score
            .previous_status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "unscored".to_string());
        println!("  status changed: {previous} -> {}", score.status);
    }
    if let Some(level) = score.breakdown.override_applied {
        println!("  {level} intent override applied");
    }
    Ok(())
}

/// `leadpilot enqueue-score <contact>`
pub async fn run_enqueue_score(
    services: &Services,
    contact_id: &str,
    json: bool,
) -> Result<(), LeadpilotError> {
    let job_id = services.score_queue.submit(contact_id).await?;
    if json {
        print_json(&serde_json::json!({ "job_id": job_id, "contact_id": contact_id }));
    } else {
        println!("queued scoring job {job_id} for {contact_id}");
    }
    Ok(())
}

/// `leadpilot worker [--once]`
///
/// With `--once` drains the queue and exits, otherwise polls until SIGINT/SIGTERM.
pub async fn run_worker(services: &Services, once: bool, json: bool) -> Result<(), LeadpilotError> {
    if !once {
        let cancel = install_signal_handler();
        services.score_queue.run(cancel).await;
        return Ok(());
    }

    let reports = services.score_queue.drain().await?;
    if json {
        print_json(&reports);
        return Ok(());
    }
    for report in &reports {
        match report {
            ScoreJobReport::Completed {
                job_id,
                contact_id,
                score,
                status,
            } => println!("job {job_id}: {contact_id} scored {score} ({status})"),
            ScoreJobReport::Failed {
                job_id,
                contact_id,
                error,
                attempts,
                exhausted,
            } => {
                let contact = contact_id.as_deref().unwrap_or("<unreadable payload>");
                let outcome = if *exhausted { "giving up" } else { "will retry" };
                println!("job {job_id}: {contact} failed after {attempts} attempt(s), {outcome}: {error}");
            }
        }
    }
    let completed = reports.iter().filter(|r| r.is_completed()).count();
    println!("{completed}/{} job(s) completed", reports.len());
    Ok(())
}

/// `leadpilot activate <campaign>` and `leadpilot retry-failed <campaign>`
pub async fn run_activate(
    services: &Services,
    campaign_id: &str,
    retry: bool,
    json: bool,
) -> Result<(), LeadpilotError> {
    let activator = services.activator()?;
    let summary = if retry {
        activator.retry_failed(campaign_id).await?
    } else {
        activator.activate(campaign_id).await?
    };
    if json {
        print_json(&summary);
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &ActivationSummary) {
    println!(
        "campaign {}: {} activated, {} deferred, {} failed, {} skipped ({} member(s))",
        summary.campaign_id,
        summary.activated_count,
        summary.deferred_count(),
        summary.failed_count(),
        summary.skipped_count,
        summary.total_contacts
    );
    for deferred in &summary.deferred {
        match deferred.active_agent {
            Some(agent) => println!("  {}: queued behind {agent}", deferred.contact_id),
            None => println!("  {}: queued, no active agent", deferred.contact_id),
        }
    }
    for failure in &summary.failures {
        println!("  {}: {}", failure.contact_id, failure.message);
    }
}

/// `leadpilot recalc <contact>`
pub async fn run_recalc(services: &Services, contact_id: &str, json: bool) -> Result<(), LeadpilotError> {
    let state = services.orchestrator.recalculate(contact_id).await?;
    print_state(&state, json);
    Ok(())
}

/// `leadpilot help-mode <contact> [--minutes N | --clear]`
pub async fn run_help_mode(
    services: &Services,
    contact_id: &str,
    minutes: Option<u32>,
    clear: bool,
    json: bool,
) -> Result<(), LeadpilotError> {
    let state = if clear {
        services.orchestrator.exit_help_mode(contact_id).await?
    } else {
        let duration = minutes.map(|m| Duration::minutes(i64::from(m)));
        services
            .orchestrator
            .enter_help_mode(contact_id, duration)
            .await?
    };
    print_state(&state, json);
    Ok(())
}

fn print_state(state: &ConversationState, json: bool) {
    if json {
        print_json(state);
        return;
    }
    let active = state.active_agent_id.as_deref().unwrap_or("none");
    println!("{}: active agent {active}", state.contact_id);
    for queued in &state.agent_queue {
        println!("  queued {} ({})", queued.agent_type, queued.agent_id);
    }
    if let Some(until) = state.help_mode_until {
        println!("  help mode until {}", until.to_rfc3339());
    }
}

/// `leadpilot expire`
pub async fn run_expire(services: &Services, json: bool) -> Result<(), LeadpilotError> {
    let contacts = services.orchestrator.expire_stale(Utc::now()).await?;
    info!(contacts = contacts.len(), "expiry sweep finished");
    if json {
        print_json(&contacts);
    } else {
        println!("{} contact(s) had expired assignments", contacts.len());
    }
    Ok(())
}
