//! Actors and tasks API.

use crate::client::PlatformClient;
use crate::error::Result;
use crate::pipeline::ApiRequest;
use crate::types::{ActorSummary, PaginatedList, TaskSummary};

/// Actors and tasks API client.
pub struct ActorsApi {
    client: PlatformClient,
}

impl ActorsApi {
    pub(crate) fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// List actors. `my` restricts the list to actors owned by the user.
    pub async fn list(
        &self,
        my: bool,
        offset: usize,
        limit: usize,
    ) -> Result<PaginatedList<ActorSummary>> {
        let mut request = ApiRequest::get("acts")
            .query("offset", offset)
            .query("limit", limit);
        if my {
            request = request.query("my", "true");
        }
        self.client.execute_json(request).await
    }

    /// List the user's tasks.
    pub async fn list_tasks(&self, offset: usize, limit: usize) -> Result<PaginatedList<TaskSummary>> {
        self.client
            .execute_json(
                ApiRequest::get("actor-tasks")
                    .query("offset", offset)
                    .query("limit", limit),
            )
            .await
    }
}
