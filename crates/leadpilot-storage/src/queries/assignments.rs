// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent assignment rows across `agent_conversations` and `product_agents`.
//!
//! Both tables are keyed by (contact, agent type). Reads return the union so
//! callers see a single assignment model.

use chrono::{DateTime, Utc};
use leadpilot_core::LeadpilotError;
use leadpilot_core::types::{
    AgentAssignment, AssignmentSource, AssignmentStatus, AssignmentUpsert, MessageDirection,
};
use rusqlite::{OptionalExtension, Row, params};

use crate::database::Database;
use crate::models::{fmt_opt_ts, fmt_ts, parse_enum, parse_opt_ts, parse_ts};

const UNION_SELECT: &str = "SELECT id, contact_id, agent_type, 'conversation', status, NULL,
            expires_at, assigned_at, messages_sent, replies_received, created_at
     FROM agent_conversations WHERE {filter}
     UNION ALL
     SELECT id, contact_id, agent_type, 'product_agent', status, product_id,
            expires_at, assigned_at, messages_sent, replies_received, created_at
     FROM product_agents WHERE {filter}";

const RETURNING: &str = "RETURNING id, contact_id, agent_type, '{source}', status, {product},
     expires_at, assigned_at, messages_sent, replies_received, created_at";

fn table_for(source: AssignmentSource) -> &'static str {
    match source {
        AssignmentSource::Conversation => "agent_conversations",
        AssignmentSource::ProductAgent => "product_agents",
    }
}

fn union_query(filter: &str) -> String {
    UNION_SELECT.replace("{filter}", filter)
}

fn assignment_from_row(row: &Row<'_>) -> rusqlite::Result<AgentAssignment> {
    let agent_type: String = row.get(2)?;
    let source: String = row.get(3)?;
    let status: String = row.get(4)?;
    let assigned_at: String = row.get(7)?;
    let created_at: String = row.get(10)?;
    Ok(AgentAssignment {
        id: row.get(0)?,
        contact_id: row.get(1)?,
        agent_type: parse_enum(2, &agent_type)?,
        source: parse_enum(3, &source)?,
        status: parse_enum(4, &status)?,
        product_id: row.get(5)?,
        expires_at: parse_opt_ts(6, row.get(6)?)?,
        assigned_at: parse_ts(7, &assigned_at)?,
        messages_sent: row.get(8)?,
        replies_received: row.get(9)?,
        created_at: parse_ts(10, &created_at)?,
    })
}

/// Every assignment for a contact across both tables, most recently assigned first.
pub async fn list_assignments(
    db: &Database,
    contact_id: &str,
) -> Result<Vec<AgentAssignment>, LeadpilotError> {
    let contact_id = contact_id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<AgentAssignment>> {
            let sql = format!(
                "{} ORDER BY assigned_at DESC",
                union_query("contact_id = ?1")
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![contact_id], assignment_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get an assignment by ID from either table.
pub async fn get_assignment(
    db: &Database,
    id: &str,
) -> Result<Option<AgentAssignment>, LeadpilotError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<AgentAssignment>> {
            conn.query_row(&union_query("id = ?1"), params![id], assignment_from_row)
                .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Create the (contact, agent type) row or reactivate it in place.
///
/// Reactivation keeps the id and counters, sets status to active and
/// refreshes `assigned_at` and `expires_at`.
pub async fn upsert_assignment(
    db: &Database,
    upsert: &AssignmentUpsert,
) -> Result<AgentAssignment, LeadpilotError> {
    let u = upsert.clone();
    let new_id = uuid::Uuid::new_v4().to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<AgentAssignment> {
            let now = fmt_ts(&Utc::now());
            let assigned_at = fmt_ts(&u.assigned_at);
            let expires_at = fmt_opt_ts(u.expires_at.as_ref());
            match u.source {
                AssignmentSource::Conversation => {
                    let sql = format!(
                        "INSERT INTO agent_conversations
                             (id, contact_id, agent_type, status, expires_at, assigned_at,
                              created_at, updated_at)
                         VALUES (?1, ?2, ?3, 'active', ?4, ?5, ?6, ?6)
                         ON CONFLICT(contact_id, agent_type) DO UPDATE SET
                             status = 'active',
                             expires_at = excluded.expires_at,
                             assigned_at = excluded.assigned_at,
                             updated_at = excluded.updated_at
                         {}",
                        RETURNING
                            .replace("{source}", "conversation")
                            .replace("{product}", "NULL")
                    );
                    conn.query_row(
                        &sql,
                        params![
                            new_id,
                            u.contact_id,
                            u.agent_type.to_string(),
                            expires_at,
                            assigned_at,
                            now
                        ],
                        assignment_from_row,
                    )
                }
                AssignmentSource::ProductAgent => {
                    let sql = format!(
                        "INSERT INTO product_agents
                             (id, contact_id, agent_type, product_id, status, expires_at,
                              assigned_at, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, 'active', ?5, ?6, ?7, ?7)
                         ON CONFLICT(contact_id, agent_type) DO UPDATE SET
                             status = 'active',
                             product_id = excluded.product_id,
                             expires_at = excluded.expires_at,
                             assigned_at = excluded.assigned_at,
                             updated_at = excluded.updated_at
                         {}",
                        RETURNING
                            .replace("{source}", "product_agent")
                            .replace("{product}", "product_id")
                    );
                    conn.query_row(
                        &sql,
                        params![
                            new_id,
                            u.contact_id,
                            u.agent_type.to_string(),
                            u.product_id.unwrap_or_default(),
                            expires_at,
                            assigned_at,
                            now
                        ],
                        assignment_from_row,
                    )
                }
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the lifecycle status of an assignment in whichever table holds it.
pub async fn set_assignment_status(
    db: &Database,
    id: &str,
    status: AssignmentStatus,
) -> Result<(), LeadpilotError> {
    let owned_id = id.to_string();
    let changed = db
        .connection()
        .call(move |conn| -> rusqlite::Result<usize> {
            let now = fmt_ts(&Utc::now());
            let mut changed = 0;
            for source in [AssignmentSource::Conversation, AssignmentSource::ProductAgent] {
                changed += conn.execute(
                    &format!(
                        "UPDATE {} SET status = ?1, updated_at = ?2 WHERE id = ?3",
                        table_for(source)
                    ),
                    params![status.to_string(), now, owned_id],
                )?;
            }
            Ok(changed)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(LeadpilotError::not_found("assignment", id));
    }
    Ok(())
}

/// Bump the sent or received counter of an assignment.
pub async fn increment_assignment_counter(
    db: &Database,
    id: &str,
    direction: MessageDirection,
) -> Result<(), LeadpilotError> {
    let owned_id = id.to_string();
    let column = match direction {
        MessageDirection::Outbound => "messages_sent",
        MessageDirection::Inbound => "replies_received",
    };
    let changed = db
        .connection()
        .call(move |conn| -> rusqlite::Result<usize> {
            let mut changed = 0;
            for source in [AssignmentSource::Conversation, AssignmentSource::ProductAgent] {
                changed += conn.execute(
                    &format!(
                        "UPDATE {table} SET {column} = {column} + 1 WHERE id = ?1",
                        table = table_for(source)
                    ),
                    params![owned_id],
                )?;
            }
            Ok(changed)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if changed == 0 {
        return Err(LeadpilotError::not_found("assignment", id));
    }
    Ok(())
}

/// Mark active rows past their expiration as expired.
///
/// Returns the distinct contact ids that lost an assignment, so their
/// conversation state can be recalculated.
pub async fn expire_assignments(
    db: &Database,
    now: DateTime<Utc>,
) -> Result<Vec<String>, LeadpilotError> {
    let cutoff = fmt_ts(&now);
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<String>> {
            let tx = conn.transaction()?;
            let mut contacts = Vec::new();
            for source in [AssignmentSource::Conversation, AssignmentSource::ProductAgent] {
                let mut stmt = tx.prepare(&format!(
                    "UPDATE {} SET status = 'expired', updated_at = ?1
                     WHERE status = 'active' AND expires_at IS NOT NULL AND expires_at <= ?1
                     RETURNING contact_id",
                    table_for(source)
                ))?;
                let rows = stmt.query_map(params![cutoff], |row| row.get::<_, String>(0))?;
                for row in rows {
                    let contact_id = row?;
                    if !contacts.contains(&contact_id) {
                        contacts.push(contact_id);
                    }
                }
            }
            tx.commit()?;
            Ok(contacts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
