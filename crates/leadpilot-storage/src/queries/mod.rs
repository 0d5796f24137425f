// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod assignments;
pub mod campaigns;
pub mod contacts;
pub mod conversation_state;
pub mod messages;
pub mod queue;
pub mod scores;
