//! Key-value stores API.

use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use url::Url;

use crate::client::PlatformClient;
use crate::error::Result;
use crate::pipeline::ApiRequest;
use crate::types::{KeyValueStore, Record, RecordMetadata};

/// Key-value stores API client.
pub struct KeyValueStoresApi {
    client: PlatformClient,
}

impl KeyValueStoresApi {
    pub(crate) fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// Get a store by ID or `username~name`.
    pub async fn get(&self, id_or_name: &str) -> Result<KeyValueStore> {
        self.client
            .execute_json(ApiRequest::get(format!("key-value-stores/{}", id_or_name)))
            .await
    }

    /// Create a named store. The platform returns the existing one when the
    /// name is taken.
    pub async fn create(&self, name: &str) -> Result<KeyValueStore> {
        self.client
            .execute_json(ApiRequest::post("key-value-stores").query("name", name))
            .await
    }

    /// Fetch a record's body and content type.
    pub async fn record(&self, store_id: &str, key: &str) -> Result<Record> {
        let response = self
            .client
            .execute(ApiRequest::get(record_path(store_id, key)).raw())
            .await?;
        Ok(Record {
            content_type: response.header(CONTENT_TYPE.as_str()).map(str::to_string),
            content: response.content,
        })
    }

    /// Probe a record's metadata without downloading it.
    pub async fn record_metadata(&self, store_id: &str, key: &str) -> Result<RecordMetadata> {
        let response = self
            .client
            .execute(ApiRequest::head(record_path(store_id, key)))
            .await?;
        Ok(RecordMetadata {
            content_type: response.header(CONTENT_TYPE.as_str()).map(str::to_string),
            content_length: response
                .header(CONTENT_LENGTH.as_str())
                .and_then(|v| v.parse().ok()),
        })
    }

    /// Write a record.
    pub async fn put_record(
        &self,
        store_id: &str,
        key: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<()> {
        self.client
            .execute(
                ApiRequest::put(record_path(store_id, key))
                    .raw()
                    .bytes(content_type, data),
            )
            .await?;
        Ok(())
    }

    /// Public URL of a record, without the token.
    pub fn record_url(&self, store_id: &str, key: &str) -> Result<Url> {
        self.client.api_url(&record_path(store_id, key))
    }
}

fn record_path(store_id: &str, key: &str) -> String {
    format!("key-value-stores/{}/records/{}", store_id, key)
}
