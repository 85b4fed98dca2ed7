//! HTTP client for the actor/task execution platform API.
//!
//! The client is built around three pieces:
//!
//! - a [`Transport`] that issues one request (the `reqwest` one by default),
//! - a [`Pipeline`] of request and response steps that attaches the token,
//!   unwraps the `{"data": ...}` envelope and classifies error statuses,
//! - [`with_retry`], which re-issues requests that failed with a retryable
//!   error (5xx, 429) using exponential backoff.
//!
//! # Example
//!
//! ```no_run
//! use runbridge_client::{PlatformClient, Result, RunOptions, RunSource};
//!
//! # async fn example() -> Result<()> {
//! let client = PlatformClient::builder()
//!     .token("secret")
//!     .build()?;
//!
//! let me = client.users().me().await?;
//! println!("Authenticated as {}", me.username);
//!
//! let run = client
//!     .runs()
//!     .start(&RunSource::actor("apify/hello-world"), None, &RunOptions::default())
//!     .await?;
//! println!("Started run {} ({})", run.id, run.status);
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Users**: token validation
//! - **Runs**: start, get, last, list for actors and tasks
//! - **Datasets**: get, create, paginated items, export URLs
//! - **Key-value stores**: get, create, record read/probe/write
//! - **Webhooks**: create, list, delete
//! - **Actors**: actor and task listings

pub mod api;
pub mod client;
pub mod error;
pub mod pipeline;
pub mod retry;
pub mod transport;
pub mod types;

pub use client::{ClientBuilder, DEFAULT_BASE_URL, DEFAULT_CONSOLE_URL, PlatformClient};
pub use error::{Error, Result};
pub use pipeline::{ApiRequest, ApiResponse, BodyShape, Pipeline, RequestBody, RequestContext};
pub use retry::{RetryPolicy, with_retry};
pub use transport::{HttpTransport, Transport};
pub use types::*;

pub use api::PAGINATION_TOTAL_HEADER;
