//! Run enrichment.
//!
//! A raw run is turned into the flat record handed to the host:
//!
//! 1. records of the run's key-value store (output key + extra keys), merged
//!    as top-level fields;
//! 2. the first page of the run's dataset plus full-export links;
//! 3. a link to the run in the web console;
//! 4. internal fields stripped.
//!
//! Steps 1 and 2 run concurrently. Neither can fail the enrichment: a failed
//! lookup shows up as an `{"error": ...}` value in the record instead.

use std::collections::BTreeMap;

use futures::future::join_all;
use runbridge_client::{PlatformClient, Run};
use serde::{Serialize, Serializer};
use serde_json::{Map, Value, json};
use tracing::warn;

use super::DomainConfig;
use super::datasets::{CleanParam, DatasetQuery, DatasetService, FetchContext};
use super::storage::StorageResolver;
use crate::constants::STRIPPED_RUN_FIELDS;

/// Per-call enrichment settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichOptions {
    /// Record key always fetched.
    pub output_key: String,
    /// Additional record keys.
    pub extra_keys: Vec<String>,
    /// Dataset items attached at most.
    pub item_limit: usize,
    pub context: FetchContext,
}

impl EnrichOptions {
    /// Options from the configured defaults.
    pub fn from_config(config: &DomainConfig, context: FetchContext) -> Self {
        Self {
            output_key: config.output_key.clone(),
            extra_keys: config.extra_keys.clone(),
            item_limit: config.dataset_item_limit,
            context,
        }
    }

    /// Add caller keys to the configured ones.
    pub fn with_extra_keys(mut self, keys: impl IntoIterator<Item = String>) -> Self {
        self.extra_keys.extend(keys);
        self
    }

    /// Output key followed by extra keys, first occurrence kept.
    pub fn record_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::with_capacity(self.extra_keys.len() + 1);
        for key in std::iter::once(&self.output_key).chain(&self.extra_keys) {
            let key = key.trim();
            if !key.is_empty() && !keys.iter().any(|k| k == key) {
                keys.push(key.to_string());
            }
        }
        keys
    }
}

/// A run with its outputs attached.
///
/// Serializes to one flat object: the run's own fields, the record values
/// under their keys, then `datasetItems`, `datasetItemsFileUrls` and
/// `detailsPageUrl`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRun {
    pub run: Run,
    /// Record values by key, in fetch order.
    pub records: Vec<(String, Value)>,
    pub dataset_items: Option<Vec<Value>>,
    pub dataset_items_file_urls: Option<BTreeMap<String, String>>,
    pub details_page_url: String,
}

impl EnrichedRun {
    /// The flat host record.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = match serde_json::to_value(&self.run) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for (key, value) in &self.records {
            map.insert(key.clone(), value.clone());
        }
        if let Some(items) = &self.dataset_items {
            map.insert("datasetItems".to_string(), Value::Array(items.clone()));
        }
        if let Some(urls) = &self.dataset_items_file_urls {
            map.insert("datasetItemsFileUrls".to_string(), json!(urls));
        }
        map.insert(
            "detailsPageUrl".to_string(),
            Value::String(self.details_page_url.clone()),
        );
        for field in STRIPPED_RUN_FIELDS {
            map.remove(field);
        }
        map
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }
}

impl Serialize for EnrichedRun {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_map().serialize(serializer)
    }
}

/// Enrichment service.
#[derive(Debug, Clone)]
pub struct EnrichmentService {
    client: PlatformClient,
    datasets: DatasetService,
    storage: StorageResolver,
}

impl EnrichmentService {
    pub fn new(client: PlatformClient, datasets: DatasetService, storage: StorageResolver) -> Self {
        Self {
            client,
            datasets,
            storage,
        }
    }

    /// Attach outputs, dataset items and the details link to a run.
    pub async fn enrich(&self, run: Run, options: &EnrichOptions) -> EnrichedRun {
        let (records, dataset) = tokio::join!(
            self.fetch_records(&run, options),
            self.fetch_dataset(&run, options)
        );
        let (dataset_items, dataset_items_file_urls) = match dataset {
            Some((items, urls)) => (Some(items), Some(urls)),
            None => (None, None),
        };

        EnrichedRun {
            details_page_url: details_page_url(&self.client, &run),
            run,
            records,
            dataset_items,
            dataset_items_file_urls,
        }
    }

    async fn fetch_records(&self, run: &Run, options: &EnrichOptions) -> Vec<(String, Value)> {
        let Some(store_id) = run.default_key_value_store_id.as_deref() else {
            return Vec::new();
        };

        let keys = options.record_keys();
        let values = join_all(keys.iter().map(|key| self.storage.record_value(store_id, key))).await;
        keys.into_iter().zip(values).collect()
    }

    async fn fetch_dataset(
        &self,
        run: &Run,
        options: &EnrichOptions,
    ) -> Option<(Vec<Value>, BTreeMap<String, String>)> {
        let dataset_id = run.default_dataset_id.as_deref()?;
        let query = DatasetQuery {
            limit: options.item_limit,
            offset: 0,
        };

        match self
            .datasets
            .fetch_items(dataset_id, query, Some(&run.act_id), options.context)
            .await
        {
            Ok(page) => Some((page.items, page.file_urls)),
            Err(e) => {
                warn!(run_id = %run.id, dataset_id, error = %e, "Dataset items unavailable");
                let urls = self
                    .datasets
                    .export_urls(dataset_id, CleanParam::for_actor(Some(&run.act_id)))
                    .unwrap_or_default();
                Some((vec![json!({ "error": e.to_string() })], urls))
            }
        }
    }
}

/// Console page of a run: under the task for task runs, under the actor
/// otherwise.
pub fn details_page_url(client: &PlatformClient, run: &Run) -> String {
    let console = client.console_url().as_str().trim_end_matches('/');
    match &run.actor_task_id {
        Some(task_id) => format!("{}/actors/tasks/{}/runs/{}", console, task_id, run.id),
        None => format!("{}/actors/{}/runs/{}", console, run.act_id, run.id),
    }
}
