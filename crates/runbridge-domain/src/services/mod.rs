//! Domain services.
//!
//! Each service wraps a clone of the same [`PlatformClient`]; the facade
//! wires them together so enrichment and webhooks share the dataset and
//! storage services.

pub mod datasets;
pub mod enrichment;
pub mod storage;
pub mod webhooks;

use runbridge_client::PlatformClient;
use runbridge_config::{DEFAULT_DATASET_ITEM_LIMIT, DEFAULT_OUTPUT_KEY, EnrichmentConfig};
use tracing::debug;

/// Configuration for domain services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainConfig {
    /// Record key always merged into enriched runs.
    pub output_key: String,
    /// Dataset items attached to an enriched run.
    pub dataset_item_limit: usize,
    /// Record keys merged into every enriched run.
    pub extra_keys: Vec<String>,
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
            dataset_item_limit: DEFAULT_DATASET_ITEM_LIMIT,
            extra_keys: Vec::new(),
        }
    }
}

impl From<&EnrichmentConfig> for DomainConfig {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            output_key: config.output_key.clone(),
            dataset_item_limit: config.dataset_item_limit,
            extra_keys: config.extra_keys.clone(),
        }
    }
}

/// Domain services facade.
///
/// Main entry point for the host-facing actions.
#[derive(Debug, Clone)]
pub struct DomainServices {
    client: PlatformClient,
    config: DomainConfig,
    datasets: datasets::DatasetService,
    storage: storage::StorageResolver,
    enrichment: enrichment::EnrichmentService,
    webhooks: webhooks::WebhookService,
}

impl DomainServices {
    /// Create domain services on top of a client.
    pub fn new(client: PlatformClient, config: DomainConfig) -> Self {
        debug!(base_url = %client.base_url(), "Initializing domain services");

        let datasets = datasets::DatasetService::new(client.clone());
        let storage = storage::StorageResolver::new(client.clone());
        let enrichment =
            enrichment::EnrichmentService::new(client.clone(), datasets.clone(), storage.clone());
        let webhooks = webhooks::WebhookService::new(client.clone(), enrichment.clone());

        Self {
            client,
            config,
            datasets,
            storage,
            enrichment,
            webhooks,
        }
    }

    /// Get the underlying client.
    pub fn client(&self) -> &PlatformClient {
        &self.client
    }

    pub fn config(&self) -> &DomainConfig {
        &self.config
    }

    /// Get the dataset service.
    pub fn datasets(&self) -> &datasets::DatasetService {
        &self.datasets
    }

    /// Get the storage resolver.
    pub fn storage(&self) -> &storage::StorageResolver {
        &self.storage
    }

    /// Get the enrichment service.
    pub fn enrichment(&self) -> &enrichment::EnrichmentService {
        &self.enrichment
    }

    /// Get the webhook service.
    pub fn webhooks(&self) -> &webhooks::WebhookService {
        &self.webhooks
    }

    /// Enrichment options from the configured defaults.
    pub fn enrich_options(&self, context: datasets::FetchContext) -> enrichment::EnrichOptions {
        enrichment::EnrichOptions::from_config(&self.config, context)
    }
}
