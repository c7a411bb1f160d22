// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider adapter trait for the structured-output generation service.

use async_trait::async_trait;

use crate::error::ServiceError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ProviderRequest, ProviderResponse};

/// Adapter for the external text-generation service.
///
/// An implementation performs exactly one request per call and never retries
/// on its own; every failure comes back as a classified [`ServiceError`] so
/// the card generator owns the retry policy.
#[async_trait]
pub trait ProviderAdapter: PluginAdapter {
    /// Sends one structured-output request and returns the raw payload.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ServiceError>;
}
