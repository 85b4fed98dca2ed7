//! Storage lookup and record values.

use runbridge_client::{Dataset, KeyValueStore, PlatformClient, Record};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::Result;

/// Get-or-create lookup of named storages, plus record decoding.
#[derive(Debug, Clone)]
pub struct StorageResolver {
    client: PlatformClient,
}

impl StorageResolver {
    pub fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// Look up a key-value store by ID or name, creating it by name when
    /// it does not exist.
    ///
    /// Only "not found" leads to creation; any other lookup failure is
    /// returned as-is.
    pub async fn key_value_store(&self, id_or_name: &str) -> Result<KeyValueStore> {
        let api = self.client.key_value_stores();
        match api.get(id_or_name).await {
            Ok(store) => Ok(store),
            Err(e) if e.is_not_found() => {
                info!(name = id_or_name, "Creating key-value store");
                Ok(api.create(id_or_name).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a dataset by ID or name, creating it by name when it does
    /// not exist.
    pub async fn dataset(&self, id_or_name: &str) -> Result<Dataset> {
        let api = self.client.datasets();
        match api.get(id_or_name).await {
            Ok(dataset) => Ok(dataset),
            Err(e) if e.is_not_found() => {
                info!(name = id_or_name, "Creating dataset");
                Ok(api.create(id_or_name).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch a record and decode it for the host.
    ///
    /// Never fails: a missing key, an unparseable body or a request error
    /// each become an `{"error": ...}` value for that key alone.
    pub async fn record_value(&self, store_id: &str, key: &str) -> Value {
        match self.client.key_value_stores().record(store_id, key).await {
            Ok(record) => decode_record(&self.client, store_id, key, &record)
                .unwrap_or_else(|detail| error_value(format!("parse failure: {}", detail))),
            Err(e) if e.is_not_found() => error_value(format!("record '{}' not found", key)),
            Err(e) => {
                debug!(store_id, key, error = %e, "Record fetch failed");
                error_value(e.to_string())
            }
        }
    }
}

/// Turn a record into a JSON value.
///
/// JSON bodies are parsed, text is kept as a string, and anything else is
/// referenced by URL.
pub(crate) fn decode_record(
    client: &PlatformClient,
    store_id: &str,
    key: &str,
    record: &Record,
) -> std::result::Result<Value, String> {
    if record.is_json() {
        return serde_json::from_slice(&record.content).map_err(|e| e.to_string());
    }
    if record.is_text() {
        return Ok(Value::String(
            String::from_utf8_lossy(&record.content).into_owned(),
        ));
    }
    let url = client
        .key_value_stores()
        .record_url(store_id, key)
        .map_err(|e| e.to_string())?;
    Ok(json!({
        "contentType": record.effective_content_type(),
        "contentLength": record.content.len(),
        "url": url.as_str(),
    }))
}

fn error_value(message: String) -> Value {
    json!({ "error": message })
}
