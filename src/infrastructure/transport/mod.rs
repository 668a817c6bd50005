pub mod http;
#[cfg(test)]
pub mod scripted;

use std::sync::Arc;

use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::SharedTransport;

pub struct TransportManager {}

impl TransportManager {
    pub fn from_config() -> Result<SharedTransport> {
        let url = Config::get(ConfigKey::ApiURL);
        let timeout = Config::get(ConfigKey::RequestTimeout).parse::<u64>()?;

        return Ok(Arc::new(http::HttpTransport::new(&url, timeout)?));
    }
}
