// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact messages and engagement events.

use leadpilot_core::LeadpilotError;
use leadpilot_core::types::{
    Channel, ContactMessage, EngagementEvent, EngagementEventKind, EngagementSignals,
    MessageDirection,
};
use rusqlite::params;

use crate::database::Database;
use crate::models::{fmt_ts, parse_enum, parse_ts};

/// Insert a new message.
pub async fn insert_message(db: &Database, msg: &ContactMessage) -> Result<(), LeadpilotError> {
    let msg = msg.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "INSERT INTO contact_messages (id, contact_id, channel, direction, body, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    msg.id,
                    msg.contact_id,
                    msg.channel.to_string(),
                    msg.direction.to_string(),
                    msg.body,
                    fmt_ts(&msg.created_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Up to `limit` messages for a contact, newest first.
pub async fn recent_messages(
    db: &Database,
    contact_id: &str,
    limit: i64,
) -> Result<Vec<ContactMessage>, LeadpilotError> {
    let contact_id = contact_id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<ContactMessage>> {
            let mut stmt = conn.prepare(
                "SELECT id, contact_id, channel, direction, body, created_at
                 FROM contact_messages WHERE contact_id = ?1
                 ORDER BY created_at DESC, rowid DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![contact_id, limit], |row| {
                let channel: String = row.get(2)?;
                let direction: String = row.get(3)?;
                let created_at: String = row.get(5)?;
                Ok(ContactMessage {
                    id: row.get(0)?,
                    contact_id: row.get(1)?,
                    channel: parse_enum(2, &channel)?,
                    direction: parse_enum(3, &direction)?,
                    body: row.get(4)?,
                    created_at: parse_ts(5, &created_at)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record an engagement event.
pub async fn record_engagement_event(
    db: &Database,
    event: &EngagementEvent,
) -> Result<(), LeadpilotError> {
    let event = event.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "INSERT INTO engagement_events (id, contact_id, kind, occurred_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    event.id,
                    event.contact_id,
                    event.kind.to_string(),
                    fmt_ts(&event.occurred_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Aggregate event counts and inbound SMS replies for a contact.
pub async fn engagement_signals(
    db: &Database,
    contact_id: &str,
) -> Result<EngagementSignals, LeadpilotError> {
    let contact_id = contact_id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<EngagementSignals> {
            let mut signals = EngagementSignals::default();

            let mut stmt = conn.prepare(
                "SELECT kind, COUNT(*) FROM engagement_events
                 WHERE contact_id = ?1 GROUP BY kind",
            )?;
            let rows = stmt.query_map(params![contact_id], |row| {
                let kind: String = row.get(0)?;
                let count: u32 = row.get(1)?;
                Ok((parse_enum::<EngagementEventKind>(0, &kind)?, count))
            })?;
            for row in rows {
                let (kind, count) = row?;
                match kind {
                    EngagementEventKind::EmailSent => signals.emails_sent = count,
                    EngagementEventKind::EmailOpened => signals.emails_opened = count,
                    EngagementEventKind::WebinarAttended => signals.webinars_attended = count,
                    EngagementEventKind::FormSubmitted => signals.forms_submitted = count,
                }
            }

            signals.inbound_sms_replies = conn.query_row(
                "SELECT COUNT(*) FROM contact_messages
                 WHERE contact_id = ?1 AND channel = ?2 AND direction = ?3",
                params![
                    contact_id,
                    Channel::Sms.to_string(),
                    MessageDirection::Inbound.to_string()
                ],
                |row| row.get(0),
            )?;

            Ok(signals)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
