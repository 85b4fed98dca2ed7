//! Host-facing actions: triggers, searches, creates and dropdown options.
//!
//! Every action is one call on [`Actions`]; results are JSON-serializable
//! records the host shows to the user. Searches that find nothing return an
//! empty result rather than an error.

use std::future::Future;

use futures::future::join_all;
use runbridge_client::{
    ActorSummary, DEFAULT_RECORD_CONTENT_TYPE, Error as ClientError, ListRunsQuery, PaginatedList,
    RunOptions, RunSource, RunStatus, TaskSummary, User,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{debug, info};

use crate::constants::{LISTING_PAGE_SIZE, MAX_WAIT_FOR_FINISH_SECS, MEMORY_OPTIONS_MB};
use crate::services::DomainServices;
use crate::services::datasets::{CleanParam, DatasetItems, DatasetQuery, FetchContext};
use crate::services::enrichment::EnrichedRun;
use crate::services::storage::decode_record;
use crate::services::webhooks::WebhookSubscription;
use crate::{DomainError, Result};

/// Input of the run action, as entered in the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunRequest {
    /// Run input as a JSON string. Overrides the saved input for tasks.
    pub input: Option<String>,
    pub build: Option<String>,
    pub memory_mbytes: Option<u32>,
    pub timeout_secs: Option<u64>,
    /// Capped at 60 seconds.
    pub wait_for_finish_secs: Option<u64>,
    /// Record keys merged into the result besides the configured ones.
    pub extra_keys: Vec<String>,
}

impl RunRequest {
    /// Check the request and split it into the run input and start options.
    pub fn validate(&self) -> Result<(Option<Value>, RunOptions)> {
        let input = match self.input.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(value @ Value::Object(_)) => Some(value),
                Ok(_) => {
                    return Err(DomainError::Validation(
                        "Input JSON is not valid: expected an object".to_string(),
                    ));
                }
                Err(e) => {
                    return Err(DomainError::Validation(format!("Input JSON is not valid: {}", e)));
                }
            },
        };

        if let Some(memory) = self.memory_mbytes
            && !MEMORY_OPTIONS_MB.contains(&memory)
        {
            return Err(DomainError::Validation(format!(
                "Memory of {} MB is not allowed; use a power of two from {} to {} MB",
                memory,
                MEMORY_OPTIONS_MB[0],
                MEMORY_OPTIONS_MB[MEMORY_OPTIONS_MB.len() - 1]
            )));
        }

        let options = RunOptions {
            build: self
                .build
                .as_deref()
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string),
            memory_mbytes: self.memory_mbytes,
            timeout_secs: self.timeout_secs,
            wait_for_finish_secs: self
                .wait_for_finish_secs
                .map(|secs| secs.min(MAX_WAIT_FOR_FINISH_SECS)),
        };
        Ok((input, options))
    }
}

/// Dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub id: String,
    pub name: String,
}

/// Host-facing actions.
#[derive(Debug, Clone)]
pub struct Actions {
    services: DomainServices,
}

impl Actions {
    pub fn new(services: DomainServices) -> Self {
        Self { services }
    }

    pub fn services(&self) -> &DomainServices {
        &self.services
    }

    /// Check the token by fetching the current user.
    pub async fn test_auth(&self) -> Result<User> {
        Ok(self.services.client().users().me().await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Runs
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a run and return it enriched.
    pub async fn run(&self, source: &RunSource, request: RunRequest) -> Result<EnrichedRun> {
        let (input, options) = request.validate()?;
        let run = self
            .services
            .client()
            .runs()
            .start(source, input, &options)
            .await?;
        info!(run_id = %run.id, source = source.id(), status = %run.status, "Run started");

        let enrich = self
            .services
            .enrich_options(FetchContext::Direct)
            .with_extra_keys(request.extra_keys);
        Ok(self.services.enrichment().enrich(run, &enrich).await)
    }

    /// Most recent run of a source, optionally with a given status.
    pub async fn find_last_run(
        &self,
        source: &RunSource,
        status: Option<RunStatus>,
        extra_keys: Vec<String>,
    ) -> Result<Vec<EnrichedRun>> {
        let Some(run) = found(self.services.client().runs().last(source, status).await)? else {
            debug!(source = source.id(), "No matching run");
            return Ok(Vec::new());
        };

        let enrich = self
            .services
            .enrich_options(FetchContext::Direct)
            .with_extra_keys(extra_keys);
        Ok(vec![self.services.enrichment().enrich(run, &enrich).await])
    }

    /// Recently finished runs of a source, newest first.
    ///
    /// Polling counterpart of the webhook trigger.
    pub async fn poll_finished_runs(&self, source: &RunSource, limit: usize) -> Result<Vec<EnrichedRun>> {
        let query = ListRunsQuery {
            limit: Some(limit),
            desc: true,
            ..Default::default()
        };
        let page = self.services.client().runs().list(source, &query).await?;
        let enrich = self.services.enrich_options(FetchContext::Trigger);
        let enrichment = self.services.enrichment();

        let finished = page
            .items
            .into_iter()
            .filter(|run| run.status.is_terminal());
        Ok(join_all(finished.map(|run| enrichment.enrich(run, &enrich))).await)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Storages
    // ─────────────────────────────────────────────────────────────────────────

    /// Items of a dataset given by ID or name.
    pub async fn fetch_dataset_items(
        &self,
        id_or_name: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Option<DatasetItems>> {
        let Some(dataset) = found(self.services.client().datasets().get(id_or_name).await)? else {
            return Ok(None);
        };

        let items = self
            .services
            .datasets()
            .fetch_items(
                &dataset.id,
                DatasetQuery { limit, offset },
                dataset.act_id.as_deref(),
                FetchContext::Direct,
            )
            .await?;
        Ok(Some(items))
    }

    /// A record of a store given by ID or name.
    ///
    /// JSON and text records come back decoded; anything else as a file
    /// reference `{contentType, contentLength, url}`.
    pub async fn get_record(&self, store_id_or_name: &str, key: &str) -> Result<Option<Value>> {
        let client = self.services.client();
        let stores = client.key_value_stores();

        let Some(store) = found(stores.get(store_id_or_name).await)? else {
            return Ok(None);
        };
        let Some(meta) = found(stores.record_metadata(&store.id, key).await)? else {
            return Ok(None);
        };

        let value = if meta.is_json() || meta.is_text() {
            let Some(record) = found(stores.record(&store.id, key).await)? else {
                return Ok(None);
            };
            decode_record(client, &store.id, key, &record).map_err(|detail| {
                DomainError::Validation(format!("Record '{}' is not valid JSON: {}", key, detail))
            })?
        } else {
            let url = stores.record_url(&store.id, key)?;
            json!({
                "contentType": meta.effective_content_type(),
                "contentLength": meta.content_length,
                "url": url.as_str(),
            })
        };

        Ok(Some(json!({
            "keyValueStoreId": store.id,
            "key": key,
            "value": value,
        })))
    }

    /// Write a record, creating the store by name when needed.
    pub async fn set_record(
        &self,
        store_id_or_name: &str,
        key: &str,
        value: &str,
        content_type: Option<&str>,
    ) -> Result<Value> {
        let content_type = content_type
            .map(str::trim)
            .filter(|ct| !ct.is_empty())
            .unwrap_or(DEFAULT_RECORD_CONTENT_TYPE);
        if content_type.contains("json")
            && let Err(e) = serde_json::from_str::<Value>(value)
        {
            return Err(DomainError::Validation(format!("Value is not valid JSON: {}", e)));
        }

        let store = self.services.storage().key_value_store(store_id_or_name).await?;
        self.services
            .client()
            .key_value_stores()
            .put_record(&store.id, key, content_type, value.as_bytes().to_vec())
            .await?;
        info!(store_id = %store.id, key, "Record written");

        let mut result = Map::new();
        result.insert("keyValueStoreId".to_string(), Value::String(store.id.clone()));
        result.insert("key".to_string(), Value::String(key.to_string()));
        if let Value::Object(fields) = serde_json::to_value(&store).map_err(ClientError::from)? {
            for (field, value) in fields {
                result.entry(field).or_insert(value);
            }
        }
        Ok(Value::Object(result))
    }

    /// Download links for a dataset without fetching it.
    pub fn dataset_file_urls(&self, dataset_id: &str, producer_actor_id: Option<&str>) -> Result<Value> {
        let urls = self
            .services
            .datasets()
            .export_urls(dataset_id, CleanParam::for_actor(producer_actor_id))?;
        Ok(json!(urls))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Dropdowns
    // ─────────────────────────────────────────────────────────────────────────

    /// Actors the user owns or has used.
    pub async fn actor_options(&self) -> Result<Vec<OptionEntry>> {
        let actors = self.services.client().actors();
        let all = collect_pages(|offset| actors.list(true, offset, LISTING_PAGE_SIZE)).await?;
        Ok(all.into_iter().map(actor_option).collect())
    }

    /// Tasks of the user.
    pub async fn task_options(&self) -> Result<Vec<OptionEntry>> {
        let actors = self.services.client().actors();
        let all = collect_pages(|offset| actors.list_tasks(offset, LISTING_PAGE_SIZE)).await?;
        Ok(all.into_iter().map(task_option).collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Webhooks
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn subscribe(&self, source: &RunSource, callback_url: &str) -> Result<WebhookSubscription> {
        self.services.webhooks().subscribe(source, callback_url).await
    }

    /// Remove a subscription; the host expects an empty object back.
    pub async fn unsubscribe(&self, webhook_id: &str) -> Result<Value> {
        self.services.webhooks().unsubscribe(webhook_id).await?;
        Ok(json!({}))
    }

    /// Enrich the run a webhook delivery refers to.
    pub async fn receive_webhook(&self, payload: &Value) -> Result<EnrichedRun> {
        let options = self.services.enrich_options(FetchContext::Trigger);
        self.services.webhooks().receive(payload, &options).await
    }
}

/// Map "not found" to `None`.
fn found<T>(result: runbridge_client::Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Walk an offset-paginated listing to the end.
async fn collect_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = runbridge_client::Result<PaginatedList<T>>>,
{
    let mut all = Vec::new();
    loop {
        let page = fetch(all.len()).await?;
        let count = page.items.len();
        all.extend(page.items);
        if count == 0 || all.len() >= page.total {
            return Ok(all);
        }
    }
}

fn actor_option(actor: ActorSummary) -> OptionEntry {
    let full_name = match &actor.username {
        Some(username) => format!("{}/{}", username, actor.name),
        None => actor.name.clone(),
    };
    let name = match actor.title.as_deref().filter(|t| !t.is_empty()) {
        Some(title) => format!("{} ({})", title, full_name),
        None => full_name,
    };
    OptionEntry { id: actor.id, name }
}

fn task_option(task: TaskSummary) -> OptionEntry {
    let name = match (&task.username, &task.act_name) {
        (Some(username), Some(act)) => format!("{}/{} ({})", username, task.name, act),
        (Some(username), None) => format!("{}/{}", username, task.name),
        _ => task.name.clone(),
    };
    OptionEntry { id: task.id, name }
}
