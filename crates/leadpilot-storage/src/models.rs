// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities and their column encodings.
//!
//! The canonical types live in `leadpilot-core::types`. Enums are stored as
//! their snake_case names, timestamps as RFC 3339 text and lists as JSON.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use serde::Serialize;
use serde::de::DeserializeOwned;

pub use leadpilot_core::types::timestamp;
pub use leadpilot_core::types::{
    AgentAssignment, Campaign, CampaignContact, Contact, ContactMessage, ConversationState,
    EngagementSignals, QueueEntry, ScoreRecord,
};

fn conversion_failure<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Parses a text column into a strum enum.
pub(crate) fn parse_enum<T>(idx: usize, text: &str) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(text).map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn parse_opt_enum<T>(idx: usize, text: Option<String>) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    text.map(|t| parse_enum(idx, &t)).transpose()
}

pub(crate) fn parse_ts(idx: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    timestamp::parse(text).map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn parse_opt_ts(
    idx: usize,
    text: Option<String>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    text.map(|t| parse_ts(idx, &t)).transpose()
}

pub(crate) fn fmt_ts(at: &DateTime<Utc>) -> String {
    timestamp::format(at)
}

pub(crate) fn fmt_opt_ts(at: Option<&DateTime<Utc>>) -> Option<String> {
    at.map(timestamp::format)
}

pub(crate) fn parse_json<T: DeserializeOwned>(idx: usize, text: &str) -> rusqlite::Result<T> {
    serde_json::from_str(text).map_err(|e| conversion_failure(idx, e))
}

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}
