//! User endpoints.

use serde_json::{Map, Value};

use zulip_core::error::ZulipResult;

use crate::client::ZulipClient;
use crate::request::Params;

/// Account details for `POST /users`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub short_name: String,
}

/// User endpoints, borrowed from a [`ZulipClient`].
#[derive(Clone, Copy)]
pub struct Users<'a> {
    client: &'a ZulipClient,
}

impl ZulipClient {
    pub fn users(&self) -> Users<'_> {
        Users { client: self }
    }
}

impl Users<'_> {
    /// List all users in the realm.
    ///
    /// With `client_gravatar` set, the server leaves `avatar_url` null for
    /// gravatar users and expects the client to compute it.
    pub async fn get_all(&self, client_gravatar: bool) -> ZulipResult<Vec<Value>> {
        let params = Params::new().with_bool("client_gravatar", client_gravatar);
        let resp = self.client.get("/users", params).await?;
        resp.extract("members")
    }

    /// Fetch the profile of the authenticated user.
    pub async fn get_current(&self, client_gravatar: bool) -> ZulipResult<Map<String, Value>> {
        let params = Params::new().with_bool("client_gravatar", client_gravatar);
        let resp = self.client.get("/users/me", params).await?;
        resp.into_payload()
    }

    /// Create a new account. Requires an administrator API key.
    pub async fn create(&self, user: &NewUser) -> ZulipResult<()> {
        let params = Params::new()
            .with("email", &user.email)
            .with("password", &user.password)
            .with("full_name", &user.full_name)
            .with("short_name", &user.short_name);
        let resp = self.client.post("/users", params).await?;
        resp.expect_success()
    }
}
