// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cached lead scores and their history rows.

use leadpilot_core::LeadpilotError;
use leadpilot_core::types::{LeadScoreUpdate, ScoreRecord};
use rusqlite::params;

use crate::database::Database;
use crate::models::{fmt_ts, parse_enum, parse_opt_enum, parse_ts};

/// Overwrite the contact's cached score fields and append the history row.
///
/// Both writes share one transaction, so the cache never moves without an
/// audit row. Fails with `NotFound` when `record.contact_id` is unknown.
pub async fn record_lead_score(
    db: &Database,
    update: &LeadScoreUpdate,
    record: &ScoreRecord,
) -> Result<(), LeadpilotError> {
    let update = *update;
    let r = record.clone();
    let updated = db
        .connection()
        .call(move |conn| -> rusqlite::Result<bool> {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE contacts SET lead_score = ?1, lead_status = ?2, likelihood_category = ?3,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?4",
                params![
                    update.score,
                    update.status.to_string(),
                    update.category.to_string(),
                    r.contact_id
                ],
            )?;
            if changed == 0 {
                return Ok(false);
            }
            tx.execute(
                "INSERT INTO score_history
                     (id, contact_id, score, status, category, previous_status, breakdown, scored_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    r.id,
                    r.contact_id,
                    r.score,
                    r.status.to_string(),
                    r.category.to_string(),
                    r.previous_status.map(|s| s.to_string()),
                    r.breakdown,
                    fmt_ts(&r.scored_at),
                ],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    if !updated {
        return Err(LeadpilotError::not_found("contact", &record.contact_id));
    }
    Ok(())
}

/// Most recent score rows for a contact, newest first.
pub async fn list_score_records(
    db: &Database,
    contact_id: &str,
    limit: i64,
) -> Result<Vec<ScoreRecord>, LeadpilotError> {
    let contact_id = contact_id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Vec<ScoreRecord>> {
            let mut stmt = conn.prepare(
                "SELECT id, contact_id, score, status, category, previous_status, breakdown, scored_at
                 FROM score_history WHERE contact_id = ?1
                 ORDER BY scored_at DESC, rowid DESC LIMIT ?2",
            )?;
            let rows = stmt.query_map(params![contact_id, limit], |row| {
                let status: String = row.get(3)?;
                let category: String = row.get(4)?;
                let scored_at: String = row.get(7)?;
                Ok(ScoreRecord {
                    id: row.get(0)?,
                    contact_id: row.get(1)?,
                    score: row.get(2)?,
                    status: parse_enum(3, &status)?,
                    category: parse_enum(4, &category)?,
                    previous_status: parse_opt_enum(5, row.get(5)?)?,
                    breakdown: row.get(6)?,
                    scored_at: parse_ts(7, &scored_at)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
