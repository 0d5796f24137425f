// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Contact CRUD.

use leadpilot_core::LeadpilotError;
use leadpilot_core::types::Contact;
use rusqlite::{OptionalExtension, Row, params};

use crate::database::Database;
use crate::models::{fmt_opt_ts, parse_json, parse_opt_enum, parse_opt_ts, to_json};

pub(crate) const CONTACT_COLUMNS: &str = "id, name, last_engagement_date, last_contact_date, total_spent,
     products_owned, tags, has_dispute, disputed_amount, last_purchase_date,
     customer_tier, lead_score, lead_status, likelihood_category";

pub(crate) fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let products: String = row.get(5)?;
    let tags: String = row.get(6)?;
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        last_engagement_date: parse_opt_ts(2, row.get(2)?)?,
        last_contact_date: parse_opt_ts(3, row.get(3)?)?,
        total_spent: row.get(4)?,
        products_owned: parse_json(5, &products)?,
        tags: parse_json(6, &tags)?,
        has_dispute: row.get(7)?,
        disputed_amount: row.get(8)?,
        last_purchase_date: parse_opt_ts(9, row.get(9)?)?,
        customer_tier: row.get(10)?,
        lead_score: row.get(11)?,
        lead_status: parse_opt_enum(12, row.get(12)?)?,
        likelihood_category: parse_opt_enum(13, row.get(13)?)?,
    })
}

/// Insert a contact or overwrite every field of an existing one.
pub async fn upsert_contact(db: &Database, contact: &Contact) -> Result<(), LeadpilotError> {
    let c = contact.clone();
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "INSERT INTO contacts (id, name, last_engagement_date, last_contact_date,
                     total_spent, products_owned, tags, has_dispute, disputed_amount,
                     last_purchase_date, customer_tier, lead_score, lead_status,
                     likelihood_category)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     last_engagement_date = excluded.last_engagement_date,
                     last_contact_date = excluded.last_contact_date,
                     total_spent = excluded.total_spent,
                     products_owned = excluded.products_owned,
                     tags = excluded.tags,
                     has_dispute = excluded.has_dispute,
                     disputed_amount = excluded.disputed_amount,
                     last_purchase_date = excluded.last_purchase_date,
                     customer_tier = excluded.customer_tier,
                     lead_score = excluded.lead_score,
                     lead_status = excluded.lead_status,
                     likelihood_category = excluded.likelihood_category,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![
                    c.id,
                    c.name,
                    fmt_opt_ts(c.last_engagement_date.as_ref()),
                    fmt_opt_ts(c.last_contact_date.as_ref()),
                    c.total_spent,
                    to_json(&c.products_owned)?,
                    to_json(&c.tags)?,
                    c.has_dispute,
                    c.disputed_amount,
                    fmt_opt_ts(c.last_purchase_date.as_ref()),
                    c.customer_tier,
                    c.lead_score,
                    c.lead_status.map(|s| s.to_string()),
                    c.likelihood_category.map(|s| s.to_string()),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a contact by ID.
pub async fn get_contact(db: &Database, id: &str) -> Result<Option<Contact>, LeadpilotError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<Contact>> {
            conn.query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1"),
                params![id],
                contact_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
