//! Users API.

use crate::client::PlatformClient;
use crate::error::Result;
use crate::pipeline::ApiRequest;
use crate::types::User;

/// Users API client.
pub struct UsersApi {
    client: PlatformClient,
}

impl UsersApi {
    pub(crate) fn new(client: PlatformClient) -> Self {
        Self { client }
    }

    /// Get the user owning the token. Doubles as the auth validation probe.
    pub async fn me(&self) -> Result<User> {
        self.client.execute_json(ApiRequest::get("users/me")).await
    }
}
