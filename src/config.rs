//! Extension configuration.
//!
//! One knob: where the push daemon lives. The value is resolved once at
//! startup and baked into the HTTP client; it is not mutable afterwards.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::info;

use crate::xapsd::DEFAULT_BASE_URL;

/// Settings for the extension.
///
/// Derives `Deserialize` so hosts can embed it in their own configuration
/// files; hosts that carry a flat property bag instead can use
/// [`Config::from_properties`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the xapsd HTTP API.
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Property key recognized by [`Config::from_properties`].
    pub const BASE_URL_PROPERTY: &'static str = "xapsd.baseUrl";

    /// Build a config from a host-supplied property map, falling back to
    /// the default daemon address when the key is absent.
    pub fn from_properties(properties: &HashMap<String, String>) -> Config {
        let base_url = properties
            .get(Self::BASE_URL_PROPERTY)
            .cloned()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        info!(
            %base_url,
            "extension configured - set property {:?} to override",
            Self::BASE_URL_PROPERTY
        );

        Config { base_url }
    }
}
