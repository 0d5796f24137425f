// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Agent assignment orchestration for the Leadpilot engine.
//!
//! Decides which of a contact's conversational agents may speak, queues the
//! displaced ones, handles handoffs, help mode and assignment lifecycles.
//! The priority rule itself lives in [`priority::resolve_priority`] and is
//! free of I/O.

pub mod locks;
pub mod orchestrator;
pub mod priority;

pub use locks::ContactLocks;
pub use orchestrator::{AgentOrchestrator, AssignmentOutcome, ContactAgents};
pub use priority::{Resolution, resolve_priority, unify_assignments};
