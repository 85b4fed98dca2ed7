//! Runs API.

use serde_json::Value;

use crate::client::PlatformClient;
use crate::error::Result;
use crate::pipeline::ApiRequest;
use crate::types::{ListRunsQuery, PaginatedList, Run, RunOptions, RunSource, RunStatus};

/// Runs API client.
pub struct RunsApi {
    client: PlatformClient,
}

impl RunsApi {
    pub(crate) fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// Start a run of an actor or task.
    ///
    /// For actors `input` is the full run input; for tasks it overrides the
    /// task's saved input.
    pub async fn start(
        &self,
        source: &RunSource,
        input: Option<Value>,
        options: &RunOptions,
    ) -> Result<Run> {
        let mut request = ApiRequest::post(source.runs_path())
            .query_opt("build", options.build.as_deref())
            .query_opt("memory", options.memory_mbytes)
            .query_opt("timeout", options.timeout_secs)
            .query_opt("waitForFinish", options.wait_for_finish_secs);
        if let Some(input) = input {
            request = request.json(input);
        }
        self.client.execute_json(request).await
    }

    /// Get a run by ID.
    pub async fn get(&self, run_id: &str) -> Result<Run> {
        self.client
            .execute_json(ApiRequest::get(format!("actor-runs/{}", run_id)))
            .await
    }

    /// Get the most recent run of a source, optionally with a given status.
    ///
    /// Returns `Error::NotFound` when no such run exists.
    pub async fn last(&self, source: &RunSource, status: Option<RunStatus>) -> Result<Run> {
        let request = ApiRequest::get(format!("{}/last", source.runs_path()))
            .query_opt("status", status.map(RunStatus::as_str));
        self.client.execute_json(request).await
    }

    /// List runs of a source.
    pub async fn list(
        &self,
        source: &RunSource,
        query: &ListRunsQuery,
    ) -> Result<PaginatedList<Run>> {
        let mut request = ApiRequest::get(source.runs_path())
            .query_opt("limit", query.limit)
            .query_opt("offset", query.offset)
            .query_opt("status", query.status.map(RunStatus::as_str));
        if query.desc {
            request = request.query("desc", 1);
        }
        self.client.execute_json(request).await
    }
}
