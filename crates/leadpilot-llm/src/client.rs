// SPDX-FileCopyrightText: 2026 Leadpilot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-over-HTTP client shared by the service adapters.
//!
//! Handles bearer authentication, the per-request timeout and mapping of
//! non-2xx responses into typed [`LeadpilotError`]s. There is no retry here;
//! callers decide how to degrade.

use std::time::Duration;

use leadpilot_config::model::ServiceEndpointConfig;
use leadpilot_core::{HealthStatus, LeadpilotError};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::types::ApiErrorResponse;

/// Which external service a client talks to. Selects the error variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    Classifier,
    Generator,
}

impl ServiceKind {
    fn label(self) -> &'static str {
        match self {
            ServiceKind::Classifier => "classifier",
            ServiceKind::Generator => "generator",
        }
    }

    pub(crate) fn error(
        self,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> LeadpilotError {
        match self {
            ServiceKind::Classifier => LeadpilotError::Classifier { message, source },
            ServiceKind::Generator => LeadpilotError::Generator { message, source },
        }
    }
}

/// HTTP client bound to one configured endpoint.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    client: reqwest::Client,
    endpoint: String,
    model: Option<String>,
    kind: ServiceKind,
}

impl ServiceClient {
    /// Builds a client from an endpoint section.
    ///
    /// Fails with [`LeadpilotError::Config`] when no endpoint is configured or
    /// the API key is not a valid header value.
    pub fn new(config: &ServiceEndpointConfig, kind: ServiceKind) -> Result<Self, LeadpilotError> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            LeadpilotError::Config(format!("{}.endpoint is not configured", kind.label()))
        })?;

        let mut headers = HeaderMap::new();
        if let Some(api_key) = &config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                LeadpilotError::Config(format!("invalid {} API key header value: {e}", kind.label()))
            })?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| kind.error(format!("failed to build HTTP client: {e}"), Some(Box::new(e))))?;

        Ok(Self {
            client,
            endpoint,
            model: config.model.clone(),
            kind,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// POSTs `body` as JSON and decodes a JSON response.
    pub async fn post_json<B, R>(&self, body: &B) -> Result<R, LeadpilotError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    format!("request timed out: {e}")
                } else {
                    format!("HTTP request failed: {e}")
                };
                self.kind.error(message, Some(Box::new(e)))
            })?;

        let status = response.status();
        debug!(service = self.kind.label(), status = %status, "response received");

        let text = response.text().await.map_err(|e| {
            self.kind
                .error(format!("failed to read response body: {e}"), Some(Box::new(e)))
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&text) {
                Ok(api_err) => format!(
                    "{} returned {status} ({}): {}",
                    self.kind.label(),
                    api_err.error.type_,
                    api_err.error.message
                ),
                Err(_) => format!("{} returned {status}: {text}", self.kind.label()),
            };
            return Err(self.kind.error(message, None));
        }

        serde_json::from_str(&text).map_err(|e| {
            self.kind
                .error(format!("failed to parse response: {e}"), Some(Box::new(e)))
        })
    }

    /// Reachability probe. Any HTTP answer, even an error status, counts as up.
    pub async fn probe(&self) -> HealthStatus {
        match self.client.get(&self.endpoint).send().await {
            Ok(response) if response.status().is_server_error() => {
                HealthStatus::Degraded(format!("endpoint returned {}", response.status()))
            }
            Ok(_) => HealthStatus::Healthy,
            Err(e) => HealthStatus::Unhealthy(format!("endpoint unreachable: {e}")),
        }
    }
}
