//! Datasets API.

use serde_json::Value;
use url::Url;

use crate::client::PlatformClient;
use crate::error::{Error, Result};
use crate::pipeline::ApiRequest;
use crate::types::{Dataset, ItemsPage, ItemsQuery};

/// Response header carrying the total item count of a dataset.
pub const PAGINATION_TOTAL_HEADER: &str = "x-apify-pagination-total";

/// Datasets API client.
pub struct DatasetsApi {
    client: PlatformClient,
}

impl DatasetsApi {
    pub(crate) fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// Get a dataset by ID or `username~name`.
    pub async fn get(&self, id_or_name: &str) -> Result<Dataset> {
        self.client
            .execute_json(ApiRequest::get(format!("datasets/{}", id_or_name)))
            .await
    }

    /// Create a named dataset. The platform returns the existing one when
    /// the name is taken.
    pub async fn create(&self, name: &str) -> Result<Dataset> {
        self.client
            .execute_json(ApiRequest::post("datasets").query("name", name))
            .await
    }

    /// Fetch one page of items.
    pub async fn items(&self, dataset_id: &str, query: &ItemsQuery) -> Result<ItemsPage> {
        let mut request = ApiRequest::get(format!("datasets/{}/items", dataset_id))
            .raw()
            .query("format", "json")
            .query_opt("limit", query.limit)
            .query_opt("offset", query.offset);
        if let Some(param) = query.clean_param {
            request = request.query(param, "true");
        }

        let response = self.client.execute(request).await?;
        let total = response
            .header(PAGINATION_TOTAL_HEADER)
            .and_then(|v| v.trim().parse::<u64>().ok());
        let items = match response.parse_content()? {
            Value::Array(items) => items,
            other => {
                return Err(Error::Api {
                    status: response.status,
                    message: format!(
                        "expected an array of dataset items, got {}",
                        json_kind(&other)
                    ),
                });
            }
        };

        Ok(ItemsPage { items, total })
    }

    /// Download URL of the whole dataset in the given format.
    ///
    /// The URL carries no token; dataset IDs are not guessable.
    pub fn export_url(&self, dataset_id: &str, format: &str, clean_param: &str) -> Result<Url> {
        let mut url = self.client.api_url(&format!("datasets/{}/items", dataset_id))?;
        url.query_pairs_mut()
            .append_pair("format", format)
            .append_pair(clean_param, "true")
            .append_pair("attachment", "true");
        Ok(url)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
