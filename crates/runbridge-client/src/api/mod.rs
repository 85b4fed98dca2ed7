//! API endpoint implementations.

mod actors;
mod datasets;
mod key_value_stores;
mod runs;
mod users;
mod webhooks;

pub use actors::ActorsApi;
pub use datasets::{DatasetsApi, PAGINATION_TOTAL_HEADER};
pub use key_value_stores::KeyValueStoresApi;
pub use runs::RunsApi;
pub use users::UsersApi;
pub use webhooks::WebhooksApi;
