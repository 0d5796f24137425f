// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign activation with mock generator and segment resolver.

use std::time::Duration;

use leadpilot_core::types::{
    AgentType, CampaignStatus, Contact, MembershipStatus, MessageType,
};
use leadpilot_core::{LeadpilotError, StorageAdapter};
use leadpilot_test_utils::TestHarness;
use tracing_test::traced_test;

async fn harness_with(contact_ids: &[&str]) -> TestHarness {
    let harness = TestHarness::new().await.unwrap();
    for id in contact_ids {
        let mut contact = Contact::new(*id);
        contact.name = Some(format!("Contact {id}"));
        harness.add_contact(contact).await.unwrap();
    }
    harness
}

#[tokio::test]
#[traced_test]
async fn one_failing_member_does_not_stop_the_batch() {
    let harness = harness_with(&["c-1", "c-2", "c-3"]).await;
    harness
        .add_campaign("camp-1", AgentType::Sales, Some(&["c-1", "c-2", "c-3"]))
        .await
        .unwrap();
    harness.generator.fail_for("c-2").await;

    let summary = harness.activator.activate("camp-1").await.unwrap();
    assert_eq!(summary.activated_count, 2);
    assert_eq!(summary.total_contacts, 3);
    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.failures[0].contact_id, "c-2");

    let members = harness.storage.list_campaign_contacts("camp-1").await.unwrap();
    let statuses: Vec<MembershipStatus> = members.iter().map(|m| m.status).collect();
    assert_eq!(
        statuses,
        vec![
            MembershipStatus::Active,
            MembershipStatus::Failed,
            MembershipStatus::Active
        ]
    );

    let failed = &members[1];
    let error = failed.last_error.as_ref().unwrap();
    assert_eq!(error.message, "message generation failed");
    assert!(error.raw_error.contains("mock generator rejected c-2"));
    assert_eq!(error.retry_count, 0);
    assert_eq!(error.message_type, MessageType::Introduction);
    assert_eq!(error.contact_name.as_deref(), Some("Contact c-2"));
    // The assignment was created before generation failed.
    assert!(failed.agent_conversation_id.is_some());

    for member in [&members[0], &members[2]] {
        assert!(member.agent_conversation_id.is_some());
        assert!(member.assigned_at.is_some());
        assert!(member.last_error.is_none());
    }

    let campaign = harness.storage.get_campaign("camp-1").await.unwrap().unwrap();
    assert_eq!(campaign.status, CampaignStatus::Active);
    assert_eq!(campaign.engaged_count, 2);
    assert!(campaign.start_date.is_some());

    assert!(logs_contain("campaign member activation failed"));
}

#[tokio::test]
async fn campaign_context_reaches_the_generator() {
    let harness = harness_with(&["c-1"]).await;
    harness
        .add_campaign("camp-1", AgentType::Onboarding, Some(&["c-1"]))
        .await
        .unwrap();

    harness.activator.activate("camp-1").await.unwrap();

    let requests = harness.generator.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.message_type, MessageType::Introduction);
    assert_eq!(request.trigger.campaign_id.as_deref(), Some("camp-1"));
    assert_eq!(request.trigger.campaign_strategy.as_deref(), Some("test strategy"));
    assert_eq!(request.trigger.previous_agent_type, None);

    let members = harness.storage.list_campaign_contacts("camp-1").await.unwrap();
    assert_eq!(
        members[0].agent_conversation_id.as_deref(),
        Some(request.assignment_id.as_str())
    );
}

#[tokio::test]
async fn displacing_an_active_agent_sends_a_handoff() {
    let harness = harness_with(&["c-1"]).await;
    let sales = harness
        .orchestrator
        .assign("c-1", AgentType::Sales)
        .await
        .unwrap();
    harness
        .add_campaign("upsell-push", AgentType::Upsell, Some(&["c-1"]))
        .await
        .unwrap();

    let summary = harness.activator.activate("upsell-push").await.unwrap();
    assert_eq!(summary.activated_count, 1);

    let requests = harness.generator.requests_for("c-1").await;
    assert_eq!(requests[0].message_type, MessageType::Handoff);
    assert_eq!(requests[0].trigger.previous_agent_type, Some(AgentType::Sales));

    let state = harness
        .storage
        .get_conversation_state("c-1")
        .await
        .unwrap()
        .unwrap();
    assert!(state.is_queued(&sales.assignment.id));
    let active = harness.orchestrator.current_active("c-1").await.unwrap().unwrap();
    assert_eq!(active.agent_type, AgentType::Upsell);
}

#[tokio::test]
#[traced_test]
async fn help_mode_defers_a_new_campaign_agent() {
    let harness = harness_with(&["c-1"]).await;
    harness
        .orchestrator
        .enter_help_mode("c-1", Some(chrono::Duration::minutes(30)))
        .await
        .unwrap();
    harness
        .add_campaign("upsell-push", AgentType::Upsell, Some(&["c-1"]))
        .await
        .unwrap();

    let summary = harness.activator.activate("upsell-push").await.unwrap();
    assert_eq!(summary.activated_count, 0);
    assert_eq!(summary.failed_count(), 0);
    assert_eq!(summary.deferred_count(), 1);
    assert_eq!(summary.deferred[0].contact_id, "c-1");
    assert_eq!(
        summary.deferred[0].active_agent,
        Some(AgentType::CustomerService)
    );

    // Customer service keeps the floor and nothing was generated.
    assert!(harness.generator.requests().await.is_empty());
    let active = harness.orchestrator.current_active("c-1").await.unwrap().unwrap();
    assert_eq!(active.agent_type, AgentType::CustomerService);

    let members = harness
        .storage
        .list_campaign_contacts("upsell-push")
        .await
        .unwrap();
    assert_eq!(members[0].status, MembershipStatus::Pending);
    assert!(members[0].agent_conversation_id.is_none());
    let campaign = harness
        .storage
        .get_campaign("upsell-push")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(campaign.engaged_count, 0);
    assert!(logs_contain("campaign member deferred"));

    // Once help mode ends a second run introduces the queued agent.
    harness.orchestrator.exit_help_mode("c-1").await.unwrap();
    let summary = harness.activator.activate("upsell-push").await.unwrap();
    assert_eq!(summary.activated_count, 1);
    assert_eq!(summary.deferred_count(), 0);
    let requests = harness.generator.requests_for("c-1").await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].message_type, MessageType::Introduction);
}

#[tokio::test]
async fn customer_service_campaign_does_not_preempt_an_active_agent() {
    let harness = harness_with(&["c-1"]).await;
    harness
        .orchestrator
        .assign("c-1", AgentType::Sales)
        .await
        .unwrap();
    harness
        .add_campaign("care", AgentType::CustomerService, Some(&["c-1"]))
        .await
        .unwrap();

    let summary = harness.activator.activate("care").await.unwrap();
    assert_eq!(summary.activated_count, 0);
    assert_eq!(summary.deferred[0].active_agent, Some(AgentType::Sales));
    assert!(harness.generator.requests_for("c-1").await.is_empty());

    let active = harness.orchestrator.current_active("c-1").await.unwrap().unwrap();
    assert_eq!(active.agent_type, AgentType::Sales);
}

#[tokio::test]
async fn activation_releases_contact_locks() {
    let harness = harness_with(&["c-1", "c-2", "c-3"]).await;
    harness
        .add_campaign("camp-1", AgentType::Sales, Some(&["c-1", "c-2", "c-3"]))
        .await
        .unwrap();

    harness.activator.activate("camp-1").await.unwrap();
    assert_eq!(harness.orchestrator.tracked_contacts(), 0);
}

#[tokio::test]
async fn empty_campaign_resolves_its_audience() {
    let harness = TestHarness::builder()
        .with_segment_contacts(&["a", "b"])
        .build()
        .await
        .unwrap();
    harness.add_plain_contact("a").await.unwrap();
    harness.add_plain_contact("b").await.unwrap();
    harness
        .add_campaign("camp-seg", AgentType::Reengagement, None)
        .await
        .unwrap();

    let summary = harness.activator.activate("camp-seg").await.unwrap();
    assert_eq!(summary.total_contacts, 2);
    assert_eq!(summary.activated_count, 2);
    assert_eq!(harness.segments.calls().await, 1);

    let campaign = harness.storage.get_campaign("camp-seg").await.unwrap().unwrap();
    assert_eq!(campaign.contact_count, 2);

    // Existing memberships are reused on the next run.
    harness.activator.activate("camp-seg").await.unwrap();
    assert_eq!(harness.segments.calls().await, 1);
}

#[tokio::test]
async fn segment_failure_aborts_activation() {
    let harness = TestHarness::new().await.unwrap();
    harness
        .add_campaign("camp-seg", AgentType::Sales, None)
        .await
        .unwrap();
    harness.segments.fail_with("segment service down").await;

    let err = harness.activator.activate("camp-seg").await.unwrap_err();
    assert!(matches!(err, LeadpilotError::Segment { .. }));
    assert!(err.to_string().contains("segment service down"));

    let campaign = harness.storage.get_campaign("camp-seg").await.unwrap().unwrap();
    assert_eq!(campaign.status, CampaignStatus::Draft);
}

#[tokio::test]
async fn unknown_campaign_is_not_found() {
    let harness = TestHarness::new().await.unwrap();
    let err = harness.activator.activate("nope").await.unwrap_err();
    assert!(matches!(err, LeadpilotError::NotFound { entity: "campaign", .. }));

    let err = harness.activator.retry_failed("nope").await.unwrap_err();
    assert!(matches!(err, LeadpilotError::NotFound { .. }));
}

#[tokio::test]
async fn reactivation_skips_failed_members() {
    let harness = harness_with(&["c-1", "c-2"]).await;
    harness
        .add_campaign("camp-1", AgentType::Sales, Some(&["c-1", "c-2"]))
        .await
        .unwrap();
    harness.generator.fail_for("c-2").await;
    harness.activator.activate("camp-1").await.unwrap();
    harness.generator.clear_failures().await;

    let summary = harness.activator.activate("camp-1").await.unwrap();
    assert_eq!(summary.activated_count, 1);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(harness.generator.requests_for("c-2").await.len(), 1);
    assert_eq!(harness.generator.requests_for("c-1").await.len(), 2);
}

#[tokio::test]
async fn retry_failed_redrives_only_failures() {
    let harness = harness_with(&["c-1", "c-2", "c-3"]).await;
    harness
        .add_campaign("camp-1", AgentType::Retention, Some(&["c-1", "c-2", "c-3"]))
        .await
        .unwrap();
    harness.generator.fail_for("c-2").await;
    harness.generator.fail_for("c-3").await;
    harness.activator.activate("camp-1").await.unwrap();

    // c-3 keeps failing, c-2 recovers.
    harness.generator.clear_failures().await;
    harness.generator.fail_for("c-3").await;
    let summary = harness.activator.retry_failed("camp-1").await.unwrap();
    assert_eq!(summary.activated_count, 1);
    assert_eq!(summary.skipped_count, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].contact_id, "c-3");

    assert_eq!(harness.generator.requests_for("c-1").await.len(), 1);
    assert_eq!(harness.generator.requests_for("c-2").await.len(), 2);

    let members = harness.storage.list_campaign_contacts("camp-1").await.unwrap();
    assert_eq!(members[1].status, MembershipStatus::Active);
    assert!(members[1].last_error.is_none());
    assert_eq!(members[2].status, MembershipStatus::Failed);
    assert_eq!(members[2].last_error.as_ref().unwrap().retry_count, 1);

    harness.activator.retry_failed("camp-1").await.unwrap();
    let members = harness.storage.list_campaign_contacts("camp-1").await.unwrap();
    assert_eq!(members[2].last_error.as_ref().unwrap().retry_count, 2);

    let campaign = harness.storage.get_campaign("camp-1").await.unwrap().unwrap();
    assert_eq!(campaign.engaged_count, 2);
}

#[tokio::test]
async fn retry_keeps_the_original_start_date() {
    let harness = harness_with(&["c-1"]).await;
    harness
        .add_campaign("camp-1", AgentType::Sales, Some(&["c-1"]))
        .await
        .unwrap();
    harness.generator.fail_for("c-1").await;
    harness.activator.activate("camp-1").await.unwrap();
    let started = harness
        .storage
        .get_campaign("camp-1")
        .await
        .unwrap()
        .unwrap()
        .start_date;

    harness.generator.clear_failures().await;
    harness.activator.retry_failed("camp-1").await.unwrap();
    let campaign = harness.storage.get_campaign("camp-1").await.unwrap().unwrap();
    assert_eq!(campaign.start_date, started);
    assert_eq!(campaign.engaged_count, 1);
}

#[tokio::test]
async fn slow_generation_is_recorded_as_timeout() {
    let harness = TestHarness::builder()
        .with_config(|c| c.campaign.generation_timeout_secs = 1)
        .build()
        .await
        .unwrap();
    harness.add_plain_contact("c-1").await.unwrap();
    harness
        .add_campaign("camp-1", AgentType::Sales, Some(&["c-1"]))
        .await
        .unwrap();
    harness.generator.set_delay(Duration::from_secs(5)).await;

    let summary = harness.activator.activate("camp-1").await.unwrap();
    assert_eq!(summary.activated_count, 0);
    assert_eq!(summary.failures[0].message, "message generation timed out");

    let members = harness.storage.list_campaign_contacts("camp-1").await.unwrap();
    let error = members[0].last_error.as_ref().unwrap();
    assert!(error.raw_error.contains("timed out"));
    assert_eq!(error.contact_name, None);
}
