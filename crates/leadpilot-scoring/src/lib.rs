// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unified lead scoring for the Leadpilot engine.
//!
//! Combines classifier-derived buying intent, engagement, purchase history,
//! activity, time decay, negative signals and a post-purchase cooldown into
//! a 0-100 score with a status and likelihood category. High-confidence
//! intent short-circuits the weighted formula.

pub mod components;
pub mod engine;
pub mod queue;

pub use engine::{LeadScore, LeadScoringEngine, ScoreBreakdown, ScoreOutcome, compute_score};
pub use queue::{SCORE_QUEUE, ScoreJob, ScoreJobReport, ScoreQueue};
