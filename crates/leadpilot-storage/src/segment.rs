// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Segment resolution over the contacts table.
//!
//! Each populated [`AudienceFilter`] criterion becomes one `AND` clause. Tag and
//! product criteria read the JSON list columns through `json_each`.

use async_trait::async_trait;
use leadpilot_core::types::AudienceFilter;
use leadpilot_core::{
    AdapterType, HealthStatus, LeadpilotError, PluginAdapter, SegmentResolverAdapter,
};
use rusqlite::types::Value;
use tracing::debug;

use crate::database::Database;

/// Resolves audience filters against the SQLite contacts table.
pub struct SqliteSegmentResolver {
    db: Database,
}

impl SqliteSegmentResolver {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Builds the WHERE clause and bound values for a filter.
fn build_query(filter: &AudienceFilter) -> (String, Vec<Value>) {
    let mut clauses: Vec<String> = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    fn placeholders(values: &mut Vec<Value>, items: impl IntoIterator<Item = Value>) -> String {
        let mut marks = Vec::new();
        for item in items {
            values.push(item);
            marks.push(format!("?{}", values.len()));
        }
        marks.join(", ")
    }

    if !filter.tags_any.is_empty() {
        let marks = placeholders(
            &mut values,
            filter.tags_any.iter().cloned().map(Value::Text),
        );
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM json_each(c.tags) WHERE json_each.value IN ({marks}))"
        ));
    }
    if !filter.exclude_tags.is_empty() {
        let marks = placeholders(
            &mut values,
            filter.exclude_tags.iter().cloned().map(Value::Text),
        );
        clauses.push(format!(
            "NOT EXISTS (SELECT 1 FROM json_each(c.tags) WHERE json_each.value IN ({marks}))"
        ));
    }
    if let Some(min) = filter.min_lead_score {
        let mark = placeholders(&mut values, [Value::Integer(i64::from(min))]);
        clauses.push(format!("c.lead_score >= {mark}"));
    }
    if let Some(max) = filter.max_lead_score {
        let mark = placeholders(&mut values, [Value::Integer(i64::from(max))]);
        clauses.push(format!("c.lead_score <= {mark}"));
    }
    if !filter.lead_statuses.is_empty() {
        let marks = placeholders(
            &mut values,
            filter
                .lead_statuses
                .iter()
                .map(|s| Value::Text(s.to_string())),
        );
        clauses.push(format!("c.lead_status IN ({marks})"));
    }
    if let Some(product) = &filter.owns_product {
        let mark = placeholders(&mut values, [Value::Text(product.clone())]);
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM json_each(c.products_owned) WHERE json_each.value = {mark})"
        ));
    }
    if let Some(min_spent) = filter.min_total_spent {
        let mark = placeholders(&mut values, [Value::Real(min_spent)]);
        clauses.push(format!("c.total_spent >= {mark}"));
    }

    let mut sql = "SELECT c.id FROM contacts c".to_string();
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY c.id ASC");
    (sql, values)
}

#[async_trait]
impl PluginAdapter for SqliteSegmentResolver {
    fn name(&self) -> &str {
        "sqlite-segments"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::SegmentResolver
    }

    async fn health_check(&self) -> Result<HealthStatus, LeadpilotError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LeadpilotError> {
        Ok(())
    }
}

#[async_trait]
impl SegmentResolverAdapter for SqliteSegmentResolver {
    async fn resolve(&self, filter: &AudienceFilter) -> Result<Vec<String>, LeadpilotError> {
        let (sql, values) = build_query(filter);
        let ids = self
            .db
            .connection()
            .call(move |conn| -> rusqlite::Result<Vec<String>> {
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt.query_map(rusqlite::params_from_iter(values.iter()), |row| {
                    row.get::<_, String>(0)
                })?;
                rows.collect()
            })
            .await
            .map_err(|e| LeadpilotError::Segment {
                message: "segment query failed".to_string(),
                source: Some(Box::new(e)),
            })?;
        debug!(matched = ids.len(), "segment resolved");
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::contacts::upsert_contact;
    use leadpilot_core::types::{Contact, LeadStatus};
    use tempfile::tempdir;

    async fn setup() -> (SqliteSegmentResolver, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let mut a = Contact::new("a");
        a.tags = vec!["vip".to_string(), "webinar".to_string()];
        a.lead_score = Some(72);
        a.lead_status = Some(LeadStatus::Hot);
        a.products_owned = vec!["course-a".to_string()];
        a.total_spent = 5400.0;

        let mut b = Contact::new("b");
        b.tags = vec!["webinar".to_string(), "do-not-contact".to_string()];
        b.lead_score = Some(55);
        b.lead_status = Some(LeadStatus::Warm);

        let mut c = Contact::new("c");
        c.lead_score = Some(20);
        c.lead_status = Some(LeadStatus::Cold);
        c.products_owned = vec!["course-a".to_string(), "coaching".to_string()];
        c.total_spent = 300.0;

        for contact in [&a, &b, &c] {
            upsert_contact(&db, contact).await.unwrap();
        }
        (SqliteSegmentResolver::new(db), dir)
    }

    #[tokio::test]
    async fn empty_filter_matches_everyone() {
        let (resolver, _dir) = setup().await;
        let ids = resolver.resolve(&AudienceFilter::default()).await.unwrap();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn tags_any_and_exclusions_combine() {
        let (resolver, _dir) = setup().await;
        let filter = AudienceFilter {
            tags_any: vec!["webinar".to_string()],
            exclude_tags: vec!["do-not-contact".to_string()],
            ..AudienceFilter::default()
        };
        assert_eq!(resolver.resolve(&filter).await.unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn score_range_and_status() {
        let (resolver, _dir) = setup().await;
        let filter = AudienceFilter {
            min_lead_score: Some(50),
            max_lead_score: Some(70),
            ..AudienceFilter::default()
        };
        assert_eq!(resolver.resolve(&filter).await.unwrap(), vec!["b"]);

        let filter = AudienceFilter {
            lead_statuses: vec![LeadStatus::Hot, LeadStatus::Cold],
            ..AudienceFilter::default()
        };
        assert_eq!(resolver.resolve(&filter).await.unwrap(), vec!["a", "c"]);
    }

    #[tokio::test]
    async fn product_and_spend() {
        let (resolver, _dir) = setup().await;
        let filter = AudienceFilter {
            owns_product: Some("course-a".to_string()),
            min_total_spent: Some(1000.0),
            ..AudienceFilter::default()
        };
        assert_eq!(resolver.resolve(&filter).await.unwrap(), vec!["a"]);
    }

    #[test]
    fn empty_filter_has_no_where_clause() {
        let (sql, values) = build_query(&AudienceFilter::default());
        assert!(!sql.contains("WHERE"));
        assert!(values.is_empty());
    }
}
