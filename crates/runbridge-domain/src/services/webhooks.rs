//! Webhook subscriptions for the run-finished trigger.
//!
//! The host hands over a callback URL when a trigger is turned on and the
//! subscription ID when it is turned off. Nothing is stored locally.

use runbridge_client::{CreateWebhookRequest, PlatformClient, RunSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::enrichment::{EnrichOptions, EnrichedRun, EnrichmentService};
use crate::constants::WEBHOOK_EVENT_TYPES;
use crate::{DomainError, Result};

/// Handle returned to the host on subscribe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSubscription {
    pub id: String,
}

/// Webhook service.
#[derive(Debug, Clone)]
pub struct WebhookService {
    client: PlatformClient,
    enrichment: EnrichmentService,
}

impl WebhookService {
    pub fn new(client: PlatformClient, enrichment: EnrichmentService) -> Self {
        Self { client, enrichment }
    }

    /// Register a webhook firing on every terminal run of `source`.
    pub async fn subscribe(&self, source: &RunSource, callback_url: &str) -> Result<WebhookSubscription> {
        let request = CreateWebhookRequest {
            event_types: WEBHOOK_EVENT_TYPES.iter().map(|e| e.to_string()).collect(),
            condition: source.condition(),
            request_url: callback_url.to_string(),
            idempotency_key: Some(Uuid::new_v4().to_string()),
        };
        let webhook = self.client.webhooks().create(&request).await?;
        info!(webhook_id = %webhook.id, source = source.id(), "Subscribed to run events");
        Ok(WebhookSubscription { id: webhook.id })
    }

    /// Remove a webhook. An already removed webhook counts as success.
    pub async fn unsubscribe(&self, webhook_id: &str) -> Result<()> {
        match self.client.webhooks().delete(webhook_id).await {
            Ok(()) => {
                info!(webhook_id, "Unsubscribed from run events");
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                debug!(webhook_id, "Webhook already removed");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Turn a delivered webhook payload into an enriched run.
    ///
    /// The run is fetched again by ID, so the payload only has to carry it.
    pub async fn receive(&self, payload: &Value, options: &EnrichOptions) -> Result<EnrichedRun> {
        let run_id = payload_run_id(payload)?;
        let run = self.client.runs().get(run_id).await?;
        Ok(self.enrichment.enrich(run, options).await)
    }
}

/// Run ID of a payload: `resource.id` of a platform delivery, or `id` of a
/// bare run.
pub fn payload_run_id(payload: &Value) -> Result<&str> {
    payload
        .pointer("/resource/id")
        .or_else(|| payload.get("id"))
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DomainError::InvalidPayload("no run ID in resource.id or id".to_string()))
}
