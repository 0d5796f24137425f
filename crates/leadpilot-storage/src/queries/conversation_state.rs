// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-contact conversation state.

use leadpilot_core::LeadpilotError;
use leadpilot_core::types::ConversationState;
use rusqlite::{OptionalExtension, params};

use crate::database::Database;
use crate::models::{fmt_opt_ts, fmt_ts, parse_json, parse_opt_ts};

/// Get the conversation state for a contact.
pub async fn get_conversation_state(
    db: &Database,
    contact_id: &str,
) -> Result<Option<ConversationState>, LeadpilotError> {
    let contact_id = contact_id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<ConversationState>> {
            conn.query_row(
                "SELECT contact_id, active_agent_id, agent_queue, help_mode_until,
                        last_engagement_at, updated_at
                 FROM conversation_state WHERE contact_id = ?1",
                params![contact_id],
                |row| {
                    let queue: String = row.get(2)?;
                    Ok(ConversationState {
                        contact_id: row.get(0)?,
                        active_agent_id: row.get(1)?,
                        agent_queue: parse_json(2, &queue)?,
                        help_mode_until: parse_opt_ts(3, row.get(3)?)?,
                        last_engagement_at: parse_opt_ts(4, row.get(4)?)?,
                        updated_at: parse_opt_ts(5, row.get(5)?)?,
                    })
                },
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Write the whole state row in one statement.
///
/// `updated_at` defaults to the current time when the caller leaves it unset.
pub async fn save_conversation_state(
    db: &Database,
    state: &ConversationState,
) -> Result<(), LeadpilotError> {
    let s = state.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            let updated_at = fmt_ts(&s.updated_at.unwrap_or_else(chrono::Utc::now));
            conn.execute(
                "INSERT INTO conversation_state
                     (contact_id, active_agent_id, agent_queue, help_mode_until,
                      last_engagement_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(contact_id) DO UPDATE SET
                     active_agent_id = excluded.active_agent_id,
                     agent_queue = excluded.agent_queue,
                     help_mode_until = excluded.help_mode_until,
                     last_engagement_at = excluded.last_engagement_at,
                     updated_at = excluded.updated_at",
                params![
                    s.contact_id,
                    s.active_agent_id,
                    crate::models::to_json(&s.agent_queue)?,
                    fmt_opt_ts(s.help_mode_until.as_ref()),
                    fmt_opt_ts(s.last_engagement_at.as_ref()),
                    updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::contacts::upsert_contact;
    use chrono::{Duration, Utc};
    use leadpilot_core::types::{AgentType, Contact, QueuedAgent};
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        upsert_contact(&db, &Contact::new("c-1")).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn missing_state_is_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_conversation_state(&db, "c-1").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn save_then_overwrite_state() {
        let (db, _dir) = setup_db().await;
        let now = Utc::now();
        let mut state = ConversationState::new("c-1");
        state.active_agent_id = Some("a-1".to_string());
        state.enqueue(QueuedAgent {
            agent_id: "a-0".to_string(),
            agent_type: AgentType::Onboarding,
            queued_at: timestamp_ms(now),
        });
        state.help_mode_until = Some(timestamp_ms(now + Duration::minutes(30)));
        state.updated_at = Some(timestamp_ms(now));
        save_conversation_state(&db, &state).await.unwrap();

        let fetched = get_conversation_state(&db, "c-1").await.unwrap().unwrap();
        assert_eq!(fetched, state);

        state.active_agent_id = None;
        state.agent_queue.clear();
        state.help_mode_until = None;
        save_conversation_state(&db, &state).await.unwrap();
        let fetched = get_conversation_state(&db, "c-1").await.unwrap().unwrap();
        assert!(fetched.active_agent_id.is_none());
        assert!(fetched.agent_queue.is_empty());
        assert!(fetched.help_mode_until.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn save_fills_updated_at() {
        let (db, _dir) = setup_db().await;
        save_conversation_state(&db, &ConversationState::new("c-1"))
            .await
            .unwrap();
        let fetched = get_conversation_state(&db, "c-1").await.unwrap().unwrap();
        assert!(fetched.updated_at.is_some());
        db.close().await.unwrap();
    }

    /// Truncates to the stored precision so round-trips compare equal.
    fn timestamp_ms(at: chrono::DateTime<Utc>) -> chrono::DateTime<Utc> {
        crate::models::timestamp::parse(&fmt_ts(&at)).unwrap()
    }
}
