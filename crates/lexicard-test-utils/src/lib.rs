// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for lexicard integration tests.
//!
//! Provides mock adapters and test harness infrastructure for fast,
//! deterministic tests without Telegram or a generation service.
//!
//! # Components
//!
//! - [`MockProvider`] - scripted generation service with recorded call times
//! - [`MockChannel`] - mock messaging channel with message injection and capture
//! - [`TestHarness`] - coordinator and router over a temp directory
//! - [`fixtures`] - canned card payloads and storage layouts

pub mod fixtures;
pub mod harness;
pub mod mock_channel;
pub mod mock_provider;

pub use harness::{TEST_USER, TestHarness};
pub use mock_channel::MockChannel;
pub use mock_provider::{MockCall, MockProvider};
