pub mod http;
#[cfg(test)]
pub mod stub;

use std::sync::Arc;

use anyhow::Result;

use crate::domain::models::RemoteArc;

pub struct RemoteManager {}

impl RemoteManager {
    /// Builds the HTTP client for the configured service URL.
    pub fn get() -> Result<RemoteArc> {
        return Ok(Arc::new(http::HttpRemote::from_config()?));
    }
}
