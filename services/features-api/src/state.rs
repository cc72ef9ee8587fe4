//! Application state for the features API.

use axum::http::{header, HeaderMap};

use features_protocol::Server;

use crate::config::ServiceConfig;

/// Shared application state.
pub struct AppState {
    /// The query dispatcher holding all registered backends.
    pub server: Server,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    pub fn new(server: Server, config: ServiceConfig) -> Self {
        Self { server, config }
    }

    /// Absolute base URL for building links.
    ///
    /// Uses the configured external URL when set, otherwise the request's
    /// Host header plus the context path.
    pub fn base_url(&self, headers: &HeaderMap) -> String {
        if let Some(base) = &self.config.base_url {
            return base.clone();
        }

        let host = headers
            .get(header::HOST)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(&self.config.listen);

        format!("http://{}{}", host, self.config.context_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(config: ServiceConfig) -> AppState {
        AppState::new(Server::new(vec![]), config.normalized())
    }

    #[test]
    fn test_base_url_from_host_header() {
        let state = state(ServiceConfig::default());
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "example.com:8084".parse().unwrap());

        assert_eq!(
            state.base_url(&headers),
            "http://example.com:8084/features"
        );
    }

    #[test]
    fn test_base_url_override() {
        let mut config = ServiceConfig::default();
        config.base_url = Some("https://data.example.com/features/".to_string());
        let state = state(config);

        assert_eq!(
            state.base_url(&HeaderMap::new()),
            "https://data.example.com/features"
        );
    }
}
