// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP adapters for the external intent classifier and message generator.
//!
//! Both services speak JSON over HTTPS with bearer authentication. The
//! adapters never retry: scoring degrades to neutral intent and campaign
//! activation records per-contact failures.

pub mod classifier;
pub mod client;
pub mod generator;
pub mod types;

pub use classifier::HttpIntentClassifier;
pub use client::{ServiceClient, ServiceKind};
pub use generator::HttpMessageGenerator;
