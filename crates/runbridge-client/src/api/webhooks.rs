//! Webhooks API.

use crate::client::PlatformClient;
use crate::error::Result;
use crate::pipeline::ApiRequest;
use crate::types::{CreateWebhookRequest, PaginatedList, Webhook};

/// Webhooks API client.
pub struct WebhooksApi {
    client: PlatformClient,
}

impl WebhooksApi {
    pub(crate) fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// Register a webhook.
    pub async fn create(&self, request: &CreateWebhookRequest) -> Result<Webhook> {
        let body = serde_json::to_value(request)?;
        self.client
            .execute_json(ApiRequest::post("webhooks").json(body))
            .await
    }

    /// List the user's webhooks.
    pub async fn list(&self, offset: usize, limit: usize) -> Result<PaginatedList<Webhook>> {
        self.client
            .execute_json(
                ApiRequest::get("webhooks")
                    .query("offset", offset)
                    .query("limit", limit),
            )
            .await
    }

    /// Delete a webhook.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .execute(ApiRequest::delete(format!("webhooks/{}", id)))
            .await?;
        Ok(())
    }
}
