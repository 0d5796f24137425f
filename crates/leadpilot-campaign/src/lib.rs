// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Campaign activation for the Leadpilot engine.
//!
//! Turns a campaign's members into live agent assignments, one contact at a
//! time, generating an introduction or handoff message for each. Per-contact
//! failures are stored on the membership row and can be re-driven with
//! [`CampaignActivator::retry_failed`].

pub mod activator;
pub mod summary;

pub use activator::CampaignActivator;
pub use summary::{ActivationSummary, ContactFailure, DeferredContact};
