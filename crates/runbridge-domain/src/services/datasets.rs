//! Dataset item fetching and export links.

use std::collections::BTreeMap;

use runbridge_client::{ItemsQuery, PlatformClient};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::Result;
use crate::constants::{EXPORT_FORMATS, LEGACY_ACTOR_ID};

/// Query flag selecting the cleaned projection of dataset items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanParam {
    Clean,
    /// Only understood by datasets of the legacy actor.
    Simplified,
}

impl CleanParam {
    /// Flag for datasets produced by the given actor.
    pub fn for_actor(actor_id: Option<&str>) -> Self {
        match actor_id {
            Some(LEGACY_ACTOR_ID) => CleanParam::Simplified,
            _ => CleanParam::Clean,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CleanParam::Clean => "clean",
            CleanParam::Simplified => "simplified",
        }
    }
}

/// Who is asking for the items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchContext {
    /// A polling or webhook trigger; truncation is reported inline.
    Trigger,
    /// A search or create action; items are returned as-is.
    Direct,
}

/// Page bounds of an item fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetQuery {
    pub limit: usize,
    pub offset: usize,
}

/// A bounded slice of a dataset plus links to the whole of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetItems {
    pub items: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    /// Download URL per export format.
    pub file_urls: BTreeMap<String, String>,
}

/// Dataset service.
#[derive(Debug, Clone)]
pub struct DatasetService {
    client: PlatformClient,
}

impl DatasetService {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// Fetch one page of items.
    ///
    /// In trigger context a warning item is appended when the dataset holds
    /// more items than `query.limit`.
    pub async fn fetch_items(
        &self,
        dataset_id: &str,
        query: DatasetQuery,
        producer_actor_id: Option<&str>,
        context: FetchContext,
    ) -> Result<DatasetItems> {
        let clean = CleanParam::for_actor(producer_actor_id);
        let page = self
            .client
            .datasets()
            .items(
                dataset_id,
                &ItemsQuery {
                    limit: Some(query.limit),
                    offset: Some(query.offset),
                    clean_param: Some(clean.as_str()),
                },
            )
            .await?;

        debug!(
            dataset_id,
            returned = page.items.len(),
            total = ?page.total,
            "Fetched dataset items"
        );

        let mut items = page.items;
        if context == FetchContext::Trigger
            && let Some(total) = page.total
            && total > query.limit as u64
        {
            items.push(truncation_warning(dataset_id, query.limit, total));
        }

        Ok(DatasetItems {
            items,
            total: page.total,
            file_urls: self.export_urls(dataset_id, clean)?,
        })
    }

    /// Download links of the whole dataset, one per export format.
    pub fn export_urls(&self, dataset_id: &str, clean: CleanParam) -> Result<BTreeMap<String, String>> {
        let datasets = self.client.datasets();
        let mut urls = BTreeMap::new();
        for format in EXPORT_FORMATS {
            let url = datasets.export_url(dataset_id, format, clean.as_str())?;
            urls.insert(format.to_string(), url.into());
        }
        Ok(urls)
    }
}

fn truncation_warning(dataset_id: &str, limit: usize, total: u64) -> Value {
    json!({
        "warning": format!(
            "Only the first {} of {} dataset items are included. \
             Use the dataset items search with dataset {} and an offset to get the rest, \
             or download the full dataset from the file URLs.",
            limit, total, dataset_id
        )
    })
}
