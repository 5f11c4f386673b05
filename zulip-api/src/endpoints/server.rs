//! Server endpoints that need no account.

use serde_json::{Map, Value};

use zulip_core::error::ZulipResult;

use crate::client::ZulipClient;
use crate::request::Params;

impl ZulipClient {
    /// Fetch the realm's public settings (`GET /server_settings`).
    ///
    /// Sent without credentials; useful for checking a realm URL before
    /// asking for an API key.
    pub async fn server_settings(&self) -> ZulipResult<Map<String, Value>> {
        let resp = self.get_anonymous("/server_settings", Params::new()).await?;
        resp.into_payload()
    }
}
