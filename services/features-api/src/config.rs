//! Service configuration.
//!
//! Settings come from an optional YAML file with environment and CLI
//! overrides applied on top by the binary.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the features API service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address.
    pub listen: String,

    /// Context path the API is served under.
    pub context_path: String,

    /// Service title, shown on the landing page.
    pub title: String,

    /// Service description, shown on the landing page.
    pub description: String,

    /// External base URL override for links. When unset, links are built
    /// from the request's Host header and the context path.
    pub base_url: Option<String>,

    /// Page size applied when the request carries no `limit`.
    pub default_limit: usize,

    /// Largest accepted `limit` value.
    pub max_limit: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8084".to_string(),
            context_path: "/features".to_string(),
            title: "Features API".to_string(),
            description: "This server is an OGC API Features service".to_string(),
            base_url: None,
            default_limit: 10,
            max_limit: 10_000,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from a YAML file, or the defaults when no path
    /// is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .with_context(|| format!("reading config file {}", path.display()))?;
                serde_yaml::from_str(&raw)
                    .with_context(|| format!("parsing config file {}", path.display()))?
            }
            None => Self::default(),
        };
        Ok(config.normalized())
    }

    /// Normalize the context path to `/segment` form: leading slash, no
    /// trailing slash. An empty or "/" path means the API sits at the root.
    pub fn normalized(mut self) -> Self {
        let trimmed = self.context_path.trim_matches('/');
        self.context_path = if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        };

        if let Some(base) = &self.base_url {
            self.base_url = Some(base.trim_end_matches('/').to_string());
        }
        self
    }
}
