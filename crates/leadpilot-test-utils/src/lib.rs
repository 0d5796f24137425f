// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Leadpilot integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without external services.
//!
//! # Components
//!
//! - [`MockIntentClassifier`] - canned intent analyses, per-contact failures and delays
//! - [`MockMessageGenerator`] - records generation requests, fails chosen contacts
//! - [`StaticSegmentResolver`] - fixed audience resolution
//! - [`TestHarness`] - the full engine on a temp SQLite database

pub mod harness;
pub mod mock_classifier;
pub mod mock_generator;
pub mod mock_segments;

pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_classifier::MockIntentClassifier;
pub use mock_generator::MockMessageGenerator;
pub use mock_segments::StaticSegmentResolver;
