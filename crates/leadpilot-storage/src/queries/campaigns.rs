// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaigns and campaign membership.

use chrono::{DateTime, Utc};
use leadpilot_core::LeadpilotError;
use leadpilot_core::types::{Campaign, CampaignContact, CampaignContactError, MembershipStatus};
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{fmt_opt_ts, fmt_ts, parse_enum, parse_json, parse_opt_ts, parse_ts, to_json};

/// Insert a new campaign.
pub async fn create_campaign(db: &Database, campaign: &Campaign) -> Result<(), LeadpilotError> {
    let c = campaign.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "INSERT INTO campaigns (id, name, agent_type, strategy, audience_filter, channel,
                     status, start_date, contact_count, engaged_count, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    c.id,
                    c.name,
                    c.agent_type.to_string(),
                    c.strategy,
                    to_json(&c.audience_filter)?,
                    c.channel.to_string(),
                    c.status.to_string(),
                    fmt_opt_ts(c.start_date.as_ref()),
                    c.contact_count,
                    c.engaged_count,
                    fmt_ts(&c.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a campaign by ID.
pub async fn get_campaign(db: &Database, id: &str) -> Result<Option<Campaign>, LeadpilotError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<Campaign>> {
            conn.query_row(
                "SELECT id, name, agent_type, strategy, audience_filter, channel, status,
                        start_date, contact_count, engaged_count, created_at
                 FROM campaigns WHERE id = ?1",
                params![id],
                |row| {
                    let agent_type: String = row.get(2)?;
                    let filter: String = row.get(4)?;
                    let channel: String = row.get(5)?;
                    let status: String = row.get(6)?;
                    let created_at: String = row.get(10)?;
                    Ok(Campaign {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        agent_type: parse_enum(2, &agent_type)?,
                        strategy: row.get(3)?,
                        audience_filter: parse_json(4, &filter)?,
                        channel: parse_enum(5, &channel)?,
                        status: parse_enum(6, &status)?,
                        start_date: parse_opt_ts(7, row.get(7)?)?,
                        contact_count: row.get(8)?,
                        engaged_count: row.get(9)?,
                        created_at: parse_ts(10, &created_at)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Memberships of a campaign in insertion order.
pub async fn list_campaign_contacts(
    db: &Database,
    campaign_id: &str,
) -> Result<Vec<CampaignContact>, LeadpilotError> {
    let campaign_id = campaign_id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<CampaignContact>> {
            let mut stmt = conn.prepare(
                "SELECT campaign_id, contact_id, status, agent_conversation_id, assigned_at,
                        last_error
                 FROM campaign_contacts WHERE campaign_id = ?1 ORDER BY rowid ASC",
            )?;
            let rows = stmt.query_map(params![campaign_id], |row| {
                let status: String = row.get(2)?;
                let last_error: Option<String> = row.get(5)?;
                Ok(CampaignContact {
                    campaign_id: row.get(0)?,
                    contact_id: row.get(1)?,
                    status: parse_enum(2, &status)?,
                    agent_conversation_id: row.get(3)?,
                    assigned_at: parse_opt_ts(4, row.get(4)?)?,
                    last_error: last_error
                        .map(|text| parse_json::<CampaignContactError>(5, &text))
                        .transpose()?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert pending memberships, skipping contacts already in the campaign.
///
/// Returns the number of rows actually inserted.
pub async fn insert_campaign_contacts(
    db: &Database,
    campaign_id: &str,
    contact_ids: &[String],
) -> Result<usize, LeadpilotError> {
    let campaign_id = campaign_id.to_string();
    let contact_ids = contact_ids.to_vec();
    db.connection()
        .call(move |conn| -> rusqlite::Result<usize> {
            let tx = conn.transaction()?;
            let mut inserted = 0;
            {
                let mut stmt = tx.prepare(
                    "INSERT OR IGNORE INTO campaign_contacts (campaign_id, contact_id, status)
                     VALUES (?1, ?2, 'pending')",
                )?;
                for contact_id in &contact_ids {
                    inserted += stmt.execute(params![campaign_id, contact_id])?;
                }
            }
            tx.commit()?;
            Ok(inserted)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the resolved audience size on a campaign.
pub async fn set_campaign_contact_count(
    db: &Database,
    campaign_id: &str,
    count: i64,
) -> Result<(), LeadpilotError> {
    let id = campaign_id.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> rusqlite::Result<usize> {
            conn.execute(
                "UPDATE campaigns SET contact_count = ?1 WHERE id = ?2",
                params![count, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(LeadpilotError::not_found("campaign", campaign_id));
    }
    Ok(())
}

/// Mark a membership active and link it to its assignment, clearing any prior error.
pub async fn mark_campaign_contact_active(
    db: &Database,
    campaign_id: &str,
    contact_id: &str,
    assignment_id: &str,
    assigned_at: DateTime<Utc>,
) -> Result<(), LeadpilotError> {
    let (campaign_id, contact_id, assignment_id) = (
        campaign_id.to_string(),
        contact_id.to_string(),
        assignment_id.to_string(),
    );
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "UPDATE campaign_contacts
                 SET status = ?1, agent_conversation_id = ?2, assigned_at = ?3, last_error = NULL
                 WHERE campaign_id = ?4 AND contact_id = ?5",
                params![
                    MembershipStatus::Active.to_string(),
                    assignment_id,
                    fmt_ts(&assigned_at),
                    campaign_id,
                    contact_id
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a membership failed with its diagnostic record.
pub async fn mark_campaign_contact_failed(
    db: &Database,
    campaign_id: &str,
    contact_id: &str,
    error: &CampaignContactError,
) -> Result<(), LeadpilotError> {
    let (campaign_id, contact_id) = (campaign_id.to_string(), contact_id.to_string());
    let error = error.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "UPDATE campaign_contacts SET status = ?1, last_error = ?2
                 WHERE campaign_id = ?3 AND contact_id = ?4",
                params![
                    MembershipStatus::Failed.to_string(),
                    to_json(&error)?,
                    campaign_id,
                    contact_id
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flip a campaign to active with its start date and engaged count.
pub async fn complete_campaign_activation(
    db: &Database,
    campaign_id: &str,
    started_at: DateTime<Utc>,
    engaged_count: i64,
) -> Result<(), LeadpilotError> {
    let id = campaign_id.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> rusqlite::Result<usize> {
            conn.execute(
                "UPDATE campaigns SET status = 'active', start_date = ?1, engaged_count = ?2
                 WHERE id = ?3",
                params![fmt_ts(&started_at), engaged_count, id],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(LeadpilotError::not_found("campaign", campaign_id));
    }
    Ok(())
}
