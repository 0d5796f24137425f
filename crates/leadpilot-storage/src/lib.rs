// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Leadpilot engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, typed queries for contacts,
//! assignments, conversation state and campaigns, a crash-safe work queue,
//! and a segment resolver over the contacts table.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod segment;

pub use adapter::SqliteStorage;
pub use database::Database;
pub use segment::SqliteSegmentResolver;
