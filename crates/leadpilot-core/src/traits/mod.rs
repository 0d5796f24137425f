// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions for the collaborators the engine depends on.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod classifier;
pub mod generator;
pub mod segment;
pub mod storage;

pub use adapter::PluginAdapter;
pub use classifier::IntentClassifierAdapter;
pub use generator::MessageGeneratorAdapter;
pub use segment::SegmentResolverAdapter;
pub use storage::StorageAdapter;
