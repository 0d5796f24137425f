// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Leadpilot engine.
//!
//! This crate provides the domain types, error type, and adapter traits shared
//! by the scoring engine, the agent orchestrator, and the campaign pipeline.
//! Storage backends and external services implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::LeadpilotError;
pub use types::{AdapterType, AgentType, HealthStatus};

// Re-export all adapter traits at crate root.
pub use traits::{
    IntentClassifierAdapter, MessageGeneratorAdapter, PluginAdapter, SegmentResolverAdapter,
    StorageAdapter,
};
