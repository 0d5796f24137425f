// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Queue operations for crash-safe message processing.

use leadpilot_core::LeadpilotError;
use leadpilot_core::types::QueueFailure;
use rusqlite::params;

use crate::database::Database;
use crate::models::QueueEntry;

/// Enqueue a new item. Returns the auto-generated queue entry ID.
pub async fn enqueue(
    db: &Database,
    queue_name: &str,
    payload: &str,
    max_attempts: i32,
) -> Result<i64, LeadpilotError> {
    let queue_name = queue_name.to_string();
    let payload = payload.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<i64> {
            conn.execute(
                "INSERT INTO queue (queue_name, payload, max_attempts) VALUES (?1, ?2, ?3)",
                params![queue_name, payload, max_attempts],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Claim the next entry from the named queue.
///
/// Takes the oldest pending entry, or a processing entry whose lock has
/// lapsed (its worker died), and marks it "processing" for five minutes.
/// Returns `None` if nothing is claimable.
pub async fn dequeue(db: &Database, queue_name: &str) -> Result<Option<QueueEntry>, LeadpilotError> {
    let queue_name = queue_name.to_string();
    db.connection()
        .call(move |conn| -> rusqlite::Result<Option<QueueEntry>> {
            let tx = conn.transaction()?;

            let result = {
                let mut stmt = tx.prepare(
                    "SELECT id, queue_name, payload, status, attempts, max_attempts,
                            created_at, updated_at, locked_until
                     FROM queue
                     WHERE queue_name = ?1
                       AND (status = 'pending'
                            OR (status = 'processing'
                                AND locked_until < strftime('%Y-%m-%dT%H:%M:%fZ', 'now')))
                     ORDER BY id ASC
                     LIMIT 1",
                )?;
                stmt.query_row(params![queue_name], |row| {
                    Ok(QueueEntry {
                        id: row.get(0)?,
                        queue_name: row.get(1)?,
                        payload: row.get(2)?,
                        status: row.get(3)?,
                        attempts: row.get(4)?,
                        max_attempts: row.get(5)?,
                        created_at: row.get(6)?,
                        updated_at: row.get(7)?,
                        locked_until: row.get(8)?,
                    })
                })
            };

            match result {
                Ok(entry) => {
                    tx.execute(
                        "UPDATE queue SET status = 'processing',
                         locked_until = strftime('%Y-%m-%dT%H:%M:%fZ', 'now', '+5 minutes'),
                         updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1",
                        params![entry.id],
                    )?;
                    tx.commit()?;

                    Ok(Some(QueueEntry {
                        status: "processing".to_string(),
                        ..entry
                    }))
                }
                Err(rusqlite::Error::QueryReturnedNoRows) => {
                    tx.commit()?;
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Acknowledge successful processing of a queue entry.
///
/// Marks the entry as "completed".
pub async fn ack(db: &Database, id: i64) -> Result<(), LeadpilotError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<()> {
            conn.execute(
                "UPDATE queue SET status = 'completed',
                 updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record a failed attempt on a queue entry.
///
/// Increments attempts. At `max_attempts` the entry is left "failed";
/// otherwise it goes back to "pending" with the lock cleared.
pub async fn fail(db: &Database, id: i64) -> Result<QueueFailure, LeadpilotError> {
    db.connection()
        .call(move |conn| -> rusqlite::Result<QueueFailure> {
            let (attempts, max_attempts): (i32, i32) = conn.query_row(
                "SELECT attempts, max_attempts FROM queue WHERE id = ?1",
                params![id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            let new_attempts = attempts + 1;
            if new_attempts >= max_attempts {
                conn.execute(
                    "UPDATE queue SET status = 'failed', attempts = ?1,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2",
                    params![new_attempts, id],
                )?;
                Ok(QueueFailure::Exhausted {
                    attempts: new_attempts,
                })
            } else {
                conn.execute(
                    "UPDATE queue SET status = 'pending', attempts = ?1,
                     locked_until = NULL,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                     WHERE id = ?2",
                    params![new_attempts, id],
                )?;
                Ok(QueueFailure::Retrying {
                    attempts: new_attempts,
                })
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn status_and_attempts(db: &Database, id: i64) -> (String, i32) {
        db.connection()
            .call(move |conn| -> rusqlite::Result<(String, i32)> {
                conn.query_row(
                    "SELECT status, attempts FROM queue WHERE id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn enqueue_and_dequeue_lifecycle() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "score", r#"{"contact_id":"c-1"}"#, 3)
            .await
            .unwrap();
        assert!(id > 0);

        let entry = dequeue(&db, "score").await.unwrap().unwrap();
        assert_eq!(entry.id, id);
        assert_eq!(entry.status, "processing");
        assert_eq!(entry.queue_name, "score");
        assert_eq!(entry.max_attempts, 3);
        assert_eq!(entry.payload, r#"{"contact_id":"c-1"}"#);

        // Claimed entries are not handed out twice while locked.
        assert!(dequeue(&db, "score").await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn dequeue_is_fifo_per_queue() {
        let (db, _dir) = setup_db().await;
        let first = enqueue(&db, "score", "a", 3).await.unwrap();
        let _other = enqueue(&db, "other", "x", 3).await.unwrap();
        let second = enqueue(&db, "score", "b", 3).await.unwrap();

        assert_eq!(dequeue(&db, "score").await.unwrap().unwrap().id, first);
        assert_eq!(dequeue(&db, "score").await.unwrap().unwrap().id, second);
        assert!(dequeue(&db, "score").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn ack_marks_completed() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "score", "payload", 3).await.unwrap();
        let _entry = dequeue(&db, "score").await.unwrap().unwrap();
        ack(&db, id).await.unwrap();

        assert_eq!(status_and_attempts(&db, id).await.0, "completed");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fail_increments_attempts_and_retries() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "score", "payload", 3).await.unwrap();
        let _entry = dequeue(&db, "score").await.unwrap().unwrap();

        let outcome = fail(&db, id).await.unwrap();
        assert_eq!(outcome, QueueFailure::Retrying { attempts: 1 });
        assert_eq!(status_and_attempts(&db, id).await, ("pending".to_string(), 1));

        // Back in the queue for another worker.
        assert_eq!(dequeue(&db, "score").await.unwrap().unwrap().id, id);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn fail_exhausts_at_max_attempts() {
        let (db, _dir) = setup_db().await;

        let id = enqueue(&db, "score", "payload", 2).await.unwrap();
        let _ = dequeue(&db, "score").await.unwrap().unwrap();
        assert_eq!(
            fail(&db, id).await.unwrap(),
            QueueFailure::Retrying { attempts: 1 }
        );
        let _ = dequeue(&db, "score").await.unwrap().unwrap();
        assert_eq!(
            fail(&db, id).await.unwrap(),
            QueueFailure::Exhausted { attempts: 2 }
        );

        assert_eq!(status_and_attempts(&db, id).await.0, "failed");
        assert!(dequeue(&db, "score").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn lapsed_lock_is_reclaimed() {
        let (db, _dir) = setup_db().await;
        let id = enqueue(&db, "score", "payload", 3).await.unwrap();
        let _ = dequeue(&db, "score").await.unwrap().unwrap();

        // Simulate a worker that died holding the entry.
        db.connection()
            .call(move |conn| -> rusqlite::Result<()> {
                conn.execute(
                    "UPDATE queue SET locked_until = '2000-01-01T00:00:00.000Z' WHERE id = ?1",
                    params![id],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let reclaimed = dequeue(&db, "score").await.unwrap().unwrap();
        assert_eq!(reclaimed.id, id);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn dequeue_empty_queue_returns_none() {
        let (db, _dir) = setup_db().await;
        assert!(dequeue(&db, "nonexistent").await.unwrap().is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn concurrent_enqueues_no_sqlite_busy() {
        let (db, _dir) = setup_db().await;

        let mut handles = Vec::new();
        for i in 0..10 {
            let db = db.clone();
            handles.push(tokio::spawn(async move {
                enqueue(&db, "score", &format!(r#"{{"n":{i}}}"#), 3).await
            }));
        }
        for handle in handles {
            let result = handle.await.unwrap();
            assert!(result.is_ok(), "concurrent write failed: {result:?}");
        }

        let count: i64 = db
            .connection()
            .call(|conn| -> rusqlite::Result<i64> {
                conn.query_row("SELECT COUNT(*) FROM queue", [], |row| row.get(0))
            })
            .await
            .unwrap();
        assert_eq!(count, 10);
        db.close().await.unwrap();
    }
}
