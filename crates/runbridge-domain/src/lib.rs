//! Domain layer for runbridge.
//!
//! Sits between the host-facing surface (the CLI, or any other transport)
//! and the platform client, providing:
//!
//! - **Run enrichment**: a run plus its key-value records, dataset items,
//!   export links and console link, as one flat record
//! - **Dataset items**: paginated fetches with trigger-context truncation
//!   warnings
//! - **Storage resolution**: get-or-create of named stores and datasets
//! - **Webhooks**: subscribe/unsubscribe for the run-finished trigger
//! - **Schema inference**: output fields derived from sample values
//!
//! # Example
//!
//! ```no_run
//! use runbridge_client::{PlatformClient, RunSource};
//! use runbridge_domain::{Actions, DomainConfig, DomainServices};
//!
//! # async fn example() -> runbridge_domain::Result<()> {
//! let client = PlatformClient::builder().token("secret").build()?;
//! let actions = Actions::new(DomainServices::new(client, DomainConfig::default()));
//!
//! for run in actions.find_last_run(&RunSource::actor("apify/web-scraper"), None, vec![]).await? {
//!     println!("{}", run.to_value());
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod constants;
mod error;
pub mod schema;
pub mod services;

pub use actions::{Actions, OptionEntry, RunRequest};
pub use error::{DomainError, Result};
pub use schema::{FieldSchema, FieldType, infer_fields};
pub use services::datasets::{CleanParam, DatasetItems, DatasetQuery, DatasetService, FetchContext};
pub use services::enrichment::{EnrichOptions, EnrichedRun, EnrichmentService};
pub use services::storage::StorageResolver;
pub use services::webhooks::{WebhookService, WebhookSubscription};
pub use services::{DomainConfig, DomainServices};
